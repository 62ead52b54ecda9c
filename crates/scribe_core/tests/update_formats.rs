use scribe_core::{init, update, Effect, Format, Msg, Reply, DEFAULT_MIME_TYPE};

fn init_logging() {
    scribe_logging::initialize_for_tests();
}

fn catalog() -> Vec<Format> {
    vec![
        Format {
            mime_type: "text/praat-textgrid".to_string(),
            name: "Praat TextGrid".to_string(),
            icon: "textgrid.png".to_string(),
        },
        Format {
            mime_type: "text/plain".to_string(),
            name: "Plain text".to_string(),
            icon: "text.png".to_string(),
        },
        Format {
            mime_type: "application/json".to_string(),
            name: "JSON".to_string(),
            icon: "json.png".to_string(),
        },
    ]
}

#[test]
fn startup_requests_the_format_catalog() {
    init_logging();
    let (_state, effects) = init();
    assert_eq!(effects, vec![Effect::LoadFormats]);
}

#[test]
fn loaded_catalog_preselects_the_first_entry() {
    init_logging();
    let (state, _) = init();
    let (mut state, effects) = update(state, Msg::FormatsLoaded(Reply::Ok(catalog())));

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.formats.len(), 3);
    assert!(view.formats[0].selected);
    assert!(!view.formats[1].selected);
    assert_eq!(view.formats_error, None);
    assert_eq!(state.selected_mime_type(), "text/praat-textgrid");
    assert!(state.consume_dirty());
}

#[test]
fn empty_catalog_falls_back_to_default_mime_type() {
    init_logging();
    let (state, _) = init();
    let (state, _) = update(state, Msg::FormatsLoaded(Reply::Ok(Vec::new())));

    assert_eq!(state.selected_mime_type(), DEFAULT_MIME_TYPE);
}

#[test]
fn selecting_a_format_moves_the_check() {
    init_logging();
    let (state, _) = init();
    let (state, _) = update(state, Msg::FormatsLoaded(Reply::Ok(catalog())));
    let (state, effects) = update(state, Msg::FormatSelected { index: 1 });

    assert!(effects.is_empty());
    assert_eq!(state.selected_mime_type(), "text/plain");
    let view = state.view();
    assert!(!view.formats[0].selected);
    assert!(view.formats[1].selected);
}

#[test]
fn out_of_range_selection_is_ignored() {
    init_logging();
    let (state, _) = init();
    let (state, _) = update(state, Msg::FormatsLoaded(Reply::Ok(catalog())));
    let (state, effects) = update(state, Msg::FormatSelected { index: 9 });

    assert!(effects.is_empty());
    assert_eq!(state.selected_mime_type(), "text/praat-textgrid");
}

#[test]
fn server_error_is_shown_verbatim_without_retry() {
    init_logging();
    let (state, _) = init();
    let (state, effects) = update(
        state,
        Msg::FormatsLoaded(Reply::ServerError {
            status: 500,
            message: "No serializers are installed".to_string(),
        }),
    );

    assert!(effects.is_empty());
    assert_eq!(
        state.view().formats_error,
        Some("No serializers are installed".to_string())
    );
}

#[test]
fn transport_error_is_shown_generically_without_retry() {
    init_logging();
    let (state, _) = init();
    let (state, effects) = update(
        state,
        Msg::FormatsLoaded(Reply::TransportError {
            message: "connection refused".to_string(),
        }),
    );

    assert!(effects.is_empty());
    assert_eq!(
        state.view().formats_error,
        Some("Could not retrieve the list of formats.".to_string())
    );
}
