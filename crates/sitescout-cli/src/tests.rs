use super::*;

use sitescout_core::{Bounds, GeoPoint};
use sitescout_map::{
    DetailLoadError, DetailOutcome, InfoOverlay, LookupError, MapSurface, MarkerView,
    MutationError, Notice, OverlayImage, SearchOutcome, SessionEvent,
};

use crate::explore::describe;
use crate::text_surface::{zoom_for, TextSurface};

#[test]
fn parses_search_command() {
    let cli = Cli::try_parse_from(["sitescout", "search", "Paris"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Search { ref term } if term == "Paris"));
}

#[test]
fn parses_detail_command() {
    let cli = Cli::try_parse_from(["sitescout", "detail", "eiffel-1"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Commands::Detail { ref id } if id == "eiffel-1"));
}

#[test]
fn explore_defaults_to_no_selection_and_no_add() {
    let cli = Cli::try_parse_from(["sitescout", "explore", "paris"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Explore {
            select: None,
            add: false,
            ..
        }
    ));
}

#[test]
fn explore_with_select_add_and_email() {
    let cli = Cli::try_parse_from([
        "sitescout",
        "explore",
        "Paris",
        "--select",
        "eiffel-1",
        "--add",
        "--email",
        "a@b.com",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Commands::Explore {
            ref term,
            select: Some(ref select),
            add: true,
            email: Some(ref email),
        } if term == "Paris" && select == "eiffel-1" && email == "a@b.com"
    ));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["sitescout"]).is_err());
}

#[test]
fn describe_skips_stale_and_skipped_events() {
    assert_eq!(
        describe(&SessionEvent::SearchSkipped {
            term: String::new()
        }),
        None
    );
    assert_eq!(
        describe(&SessionEvent::Detail(DetailOutcome::Stale {
            site_id: "eiffel-1".to_owned(),
            generation: 1,
        })),
        None
    );
}

#[test]
fn describe_reports_outcomes() {
    assert_eq!(
        describe(&SessionEvent::Search(SearchOutcome::Applied {
            term: "paris".to_owned(),
            sites: 2,
            cleared_selection: None,
        }))
        .as_deref(),
        Some("found 2 site(s) for \"paris\"")
    );
    assert_eq!(
        describe(&SessionEvent::Search(SearchOutcome::NoResults {
            term: "atlantis".to_owned(),
            cleared_selection: None,
        }))
        .as_deref(),
        Some("no sites found for \"atlantis\"")
    );

    let failed = describe(&SessionEvent::Detail(DetailOutcome::Failed(DetailLoadError {
        site_id: "tram-28".to_owned(),
        source: LookupError::Network("timeout".to_owned()),
    })))
    .unwrap();
    assert!(failed.contains("tram-28"));

    let list = describe(&SessionEvent::ListUpdated(Err(MutationError::MissingIdentity))).unwrap();
    assert_eq!(list, "list update failed: no signed-in user");
}

#[test]
fn zoom_for_point_is_max_and_shrinks_with_span() {
    let paris = GeoPoint::new(48.8566, 2.3522).unwrap();
    assert_eq!(zoom_for(&Bounds::around(paris)), 20);

    let city = Bounds::around(paris).extend(GeoPoint::new(48.9, 2.45).unwrap());
    let region = Bounds::around(paris).extend(GeoPoint::new(50.0, 4.0).unwrap());
    assert!(zoom_for(&city) > zoom_for(&region));

    let world = Bounds::around(GeoPoint::new(-90.0, -180.0).unwrap())
        .extend(GeoPoint::new(90.0, 180.0).unwrap());
    assert_eq!(zoom_for(&world), 0);
}

#[test]
fn text_surface_renders_markers_overlay_and_notice() {
    let mut surface = TextSurface::default();
    let eiffel = GeoPoint::new(48.8584, 2.2945).unwrap();
    surface.fit_bounds(Bounds::around(eiffel));
    surface.place_marker(&MarkerView {
        key: "eiffel-1".to_owned(),
        name: "Eiffel Tower".to_owned(),
        position: eiffel,
        active: true,
    });
    surface.open_overlay(&InfoOverlay {
        marker_key: "eiffel-1".to_owned(),
        title: "Eiffel Tower".to_owned(),
        image: OverlayImage::Placeholder,
        learn_more_href: "/search/eiffel-1".to_owned(),
    });
    surface.show_notice(&Notice::NoResults {
        term: "x".to_owned(),
    });

    let out = surface.render();
    assert!(out.starts_with("map @ (48.85840, 2.29450) zoom 20"));
    assert!(out.contains(" * eiffel-1"));
    assert!(out.contains("image: no image available"));
    assert!(out.contains("learn more: /search/eiffel-1"));
    assert!(out.contains("! no sites found for \"x\""));

    surface.show_loading();
    assert!(surface.render().ends_with("loading...\n"));
}
