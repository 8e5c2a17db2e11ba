mod common;

use common::{config, labels, sleep_ms, yield_a_bit, ScriptedBackend};
use locality_core::{
    AddressAutocomplete, AddressDraft, AddressField, LocalityPhase, SearchPhase, StoredAddress,
};
use std::sync::Arc;

fn form(backend: &Arc<ScriptedBackend>) -> AddressAutocomplete<ScriptedBackend> {
    AddressAutocomplete::new(Arc::clone(backend), config())
}

// --- Candidate search ---

#[tokio::test(start_paused = true)]
async fn short_input_never_reaches_the_backend() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    for q in ["", "5", "55", "  55  "] {
        form.on_input(q);
    }
    sleep_ms(1_000).await;
    form.settle().await;

    assert!(backend.searches().is_empty());
    assert!(form.candidates().is_empty());
    assert_eq!(form.search_phase(), SearchPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn search_fires_only_after_the_quiet_period() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    form.on_input("550");
    sleep_ms(299).await;
    assert!(backend.searches().is_empty());

    sleep_ms(2).await;
    yield_a_bit().await;
    assert_eq!(backend.searches(), ["550"]);
    assert_eq!(labels(&form.candidates()), ["55001", "55002"]);
    assert_eq!(form.search_phase(), SearchPhase::CandidatesShown);
}

#[tokio::test(start_paused = true)]
async fn keystroke_burst_sends_one_request() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    for q in ["5", "55", "550", "5500"] {
        form.on_input(q);
        sleep_ms(100).await;
    }
    form.settle().await;

    assert_eq!(backend.searches(), ["5500"]);
    assert_eq!(form.search().requests_sent(), 1);
}

#[tokio::test(start_paused = true)]
async fn pauses_longer_than_the_debounce_search_each_time() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    form.on_input("550");
    sleep_ms(400).await;
    form.on_input("5500");
    form.settle().await;

    assert_eq!(backend.searches(), ["550", "5500"]);
}

#[tokio::test(start_paused = true)]
async fn loading_flag_spans_the_request() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.delay_search("550", 500);
    let form = form(&backend);

    form.on_input("550");
    sleep_ms(350).await;
    assert!(form.is_loading());
    assert_eq!(form.search_phase(), SearchPhase::Searching);

    form.settle().await;
    assert!(!form.is_loading());
    assert_eq!(form.search_phase(), SearchPhase::CandidatesShown);
}

#[tokio::test(start_paused = true)]
async fn repeated_queries_are_served_from_cache() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    for q in ["550", "5500", "550", " 550 "] {
        form.on_input(q);
        form.settle().await;
    }

    assert_eq!(backend.searches(), ["550", "5500"]);
    assert_eq!(form.search().cached_queries(), 2);
    assert_eq!(labels(&form.candidates()), ["55001", "55002"]);
}

#[tokio::test(start_paused = true)]
async fn cache_keys_are_case_sensitive() {
    let backend = Arc::new(ScriptedBackend::default());
    backend
        .with_candidates("abc", &[("a1", "ABC 1")])
        .with_candidates("ABC", &[("a2", "ABC 2")]);
    let form = form(&backend);

    form.on_input("abc");
    form.settle().await;
    form.on_input("ABC");
    form.settle().await;

    assert_eq!(backend.searches(), ["abc", "ABC"]);
    assert_eq!(labels(&form.candidates()), ["ABC 2"]);
}

#[tokio::test(start_paused = true)]
async fn slow_earlier_response_never_overwrites_a_newer_one() {
    let backend = Arc::new(ScriptedBackend::default());
    backend
        .with_candidates("550", &[("old", "55099")])
        .with_candidates("5500", &[("z1", "55001")])
        .delay_search("550", 500)
        .delay_search("5500", 10);
    let form = form(&backend);

    form.on_input("550");
    sleep_ms(350).await;
    assert_eq!(backend.searches(), ["550"]);

    form.on_input("5500");
    form.settle().await;
    assert_eq!(labels(&form.candidates()), ["55001"]);

    // The first response lands now and must be ignored.
    sleep_ms(1_000).await;
    assert_eq!(labels(&form.candidates()), ["55001"]);
    assert!(!form.is_loading());
    assert_eq!(form.search().cached_queries(), 1);
}

#[tokio::test(start_paused = true)]
async fn cache_hit_supersedes_an_older_search_in_flight() {
    let backend = Arc::new(ScriptedBackend::default());
    backend
        .with_candidates("550", &[("z1", "55001"), ("z2", "55002")])
        .with_candidates("5500", &[("z9", "55009")])
        .delay_search("5500", 500);
    let form = form(&backend);

    form.on_input("550");
    form.settle().await;
    assert_eq!(form.search().cached_queries(), 1);

    form.on_input("5500");
    sleep_ms(350).await;
    assert!(form.is_loading());

    // Served from cache at 650ms while "5500" is still out until 800ms.
    form.on_input("550");
    sleep_ms(350).await;
    assert_eq!(labels(&form.candidates()), ["55001", "55002"]);
    assert!(!form.is_loading());

    sleep_ms(1_000).await;
    form.settle().await;
    assert_eq!(backend.searches(), ["550", "5500"]);
    assert_eq!(labels(&form.candidates()), ["55001", "55002"]);
    assert!(!form.is_loading());
    assert_eq!(form.search().cached_queries(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn short_input_right_after_focus_never_leaves_the_spinner_on() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.delay_search("", 60_000);
    let form = form(&backend);

    for round in 0..500 {
        form.on_focus();
        form.on_input("5");
        tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        assert!(!form.is_loading(), "spinner stuck in round {round}");
        assert_eq!(form.search_phase(), SearchPhase::Idle);
    }
}

#[tokio::test(start_paused = true)]
async fn shortening_the_query_discards_the_search_in_flight() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.delay_search("550", 500);
    let form = form(&backend);

    form.on_input("550");
    sleep_ms(350).await;
    assert!(form.is_loading());

    form.on_input("55");
    assert!(!form.is_loading());
    sleep_ms(1_000).await;

    assert!(form.candidates().is_empty());
    assert_eq!(form.search_phase(), SearchPhase::Idle);
    assert_eq!(form.search().cached_queries(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_search_shows_nothing_and_is_retried_later() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.fail_search("550");
    let form = form(&backend);

    form.on_input("550");
    form.settle().await;
    assert!(form.candidates().is_empty());
    assert!(!form.is_loading());
    assert!(form.search().last_error().is_some());

    form.on_input("5500");
    form.settle().await;
    assert!(form.search().last_error().is_none());

    form.on_input("550");
    form.settle().await;
    assert_eq!(backend.searches(), ["550", "5500", "550"]);
}

#[tokio::test(start_paused = true)]
async fn focus_prefetches_the_unfiltered_list_once() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    assert!(form.on_focus());
    form.settle().await;
    assert_eq!(backend.searches(), [""]);
    assert_eq!(form.candidates().len(), 3);

    // List already shown
    assert!(!form.on_focus());

    form.on_input("55");
    assert!(form.candidates().is_empty());
    assert!(form.on_focus());
    form.settle().await;
    assert_eq!(backend.searches(), [""]);
    assert_eq!(form.candidates().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn search_request_carries_paging_and_country() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let cfg = config().with_country("US").with_page(2, 50);
    let form = AddressAutocomplete::new(Arc::clone(&backend), cfg);

    form.on_input("606");
    form.settle().await;

    let reqs = backend.search_requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].query, "606");
    assert_eq!(reqs[0].page_offset, 2);
    assert_eq!(reqs[0].page_size, 50);
    assert_eq!(reqs[0].country_id.as_deref(), Some("US"));
}

// --- Locality resolution ---

#[tokio::test(start_paused = true)]
async fn selecting_a_candidate_resolves_city_and_state() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    form.select("z1", "55001");
    let d = form.draft();
    assert_eq!(d.postal_code_id(), Some("z1"));
    assert_eq!(d.postal_code(), "55001");
    assert_eq!(d.city(), "");
    assert_eq!(form.locality_phase(), LocalityPhase::Resolving("z1".into()));

    form.settle().await;
    let d = form.draft();
    assert_eq!(d.city(), "Springfield");
    assert_eq!(d.state(), "IL");
    assert_eq!(d.city_id(), Some("c9"));
    assert_eq!(d.state_id(), Some("s2"));
    assert_eq!(backend.locality_requests(), ["z1"]);
    assert_eq!(form.locality_phase(), LocalityPhase::Resolved);
}

#[tokio::test(start_paused = true)]
async fn new_selection_blanks_the_previous_locality_at_once() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    form.select("z1", "55001");
    form.settle().await;
    assert_eq!(form.draft().city(), "Springfield");

    form.select("z60601", "60601");
    assert_eq!(form.draft().city(), "");
    assert_eq!(form.draft().state(), "");

    form.settle().await;
    assert_eq!(form.draft().city(), "Chicago");
    assert_eq!(backend.locality_requests(), ["z1", "z60601"]);
}

#[tokio::test(start_paused = true)]
async fn reselecting_aborts_the_earlier_resolution() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.delay_locality("z1", 500).delay_locality("z60601", 10);
    let form = form(&backend);

    form.select("z1", "55001");
    sleep_ms(50).await;
    form.select("z60601", "60601");
    form.settle().await;
    sleep_ms(1_000).await;

    let d = form.draft();
    assert_eq!(d.postal_code_id(), Some("z60601"));
    assert_eq!(d.city(), "Chicago");
    assert_eq!(backend.locality_requests(), ["z1", "z60601"]);
    assert!(form.resolver().last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn clearing_sends_no_request() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    form.select("z1", "55001");
    form.settle().await;
    form.clear();

    let d = form.draft();
    assert_eq!(d.postal_code_id(), None);
    assert_eq!(d.postal_code(), "");
    assert_eq!(d.city(), "");
    assert_eq!(d.state(), "");
    sleep_ms(1_000).await;
    assert_eq!(backend.locality_requests(), ["z1"]);
    assert_eq!(form.locality_phase(), LocalityPhase::NoLocality);
}

#[tokio::test(start_paused = true)]
async fn clearing_mid_flight_drops_the_late_result_silently() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.delay_locality("z1", 200);
    let form = form(&backend);

    form.select("z1", "55001");
    yield_a_bit().await;
    assert_eq!(backend.locality_requests(), ["z1"]);

    form.clear();
    sleep_ms(1_000).await;

    assert_eq!(form.draft().city(), "");
    assert_eq!(form.locality_phase(), LocalityPhase::NoLocality);
    assert!(form.resolver().last_error().is_none());
}

#[tokio::test(start_paused = true)]
async fn selecting_a_blank_id_behaves_like_clear() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    form.select("z1", "55001");
    form.settle().await;
    form.select("  ", "");
    form.settle().await;

    assert_eq!(form.draft().postal_code_id(), None);
    assert_eq!(form.draft().city(), "");
    assert_eq!(backend.locality_requests(), ["z1"]);
}

#[tokio::test(start_paused = true)]
async fn failed_resolution_leaves_city_and_state_empty() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.fail_locality("z2");
    let form = form(&backend);
    form.set_address_lines("1 Elm St", "");

    form.select("z2", "55002");
    form.settle().await;

    let d = form.draft();
    assert_eq!(d.postal_code_id(), Some("z2"));
    assert_eq!(d.city(), "");
    assert_eq!(d.state(), "");
    assert_eq!(form.locality_phase(), LocalityPhase::NoLocality);
    assert!(form.resolver().last_error().is_some());

    let errors = form.validate().unwrap_err();
    assert_eq!(errors.get(AddressField::City), Some("City is required"));
    assert_eq!(errors.get(AddressField::State), Some("State is required"));
    assert_eq!(errors.get(AddressField::PostalCode), None);
}

#[tokio::test(start_paused = true)]
async fn hanging_resolution_times_out_as_a_failure() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.hang_locality("z1");
    let form = form(&backend);

    form.select("z1", "55001");
    sleep_ms(1_000).await;
    assert!(form.resolver().is_resolving());

    form.settle().await;
    assert_eq!(form.draft().city(), "");
    assert_eq!(form.locality_phase(), LocalityPhase::NoLocality);
    let err = form.resolver().last_error().unwrap();
    assert!(err.contains("timed out"), "{err}");
}

#[tokio::test(start_paused = true)]
async fn unknown_postal_code_counts_as_a_failure() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    form.select("z404", "99999");
    form.settle().await;

    assert_eq!(backend.locality_requests(), ["z404"]);
    assert_eq!(form.draft().city(), "");
    assert!(form.resolver().last_error().is_some());
}

// --- Edit mode and reset ---

#[tokio::test(start_paused = true)]
async fn stored_address_without_locality_is_resolved_on_load() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let stored: StoredAddress = serde_json::from_str(
        r#"{"address1":"1 Elm St","zipCodeId":"z1","zipCode":"55001","countryId":"US"}"#,
    )
    .unwrap();

    let form = form(&backend).with_draft(stored.into());
    assert_eq!(labels(&form.candidates()), ["55001"]);

    form.settle().await;
    assert_eq!(form.draft().city(), "Springfield");
    assert_eq!(backend.locality_requests(), ["z1"]);
    assert!(form.validate().is_ok());
}

#[tokio::test(start_paused = true)]
async fn stored_address_with_partial_locality_is_cleared_when_resolution_fails() {
    let backend = Arc::new(ScriptedBackend::springfield());
    backend.fail_locality("z1");
    let stored = StoredAddress {
        zip_code_id: Some("z1".into()),
        zip_code: Some("55001".into()),
        city_name: Some("Springfield".into()),
        ..StoredAddress::default()
    };

    let form = form(&backend).with_draft(stored.into());
    form.settle().await;

    assert_eq!(form.draft().city(), "");
    assert_eq!(form.draft().state(), "");
    assert_eq!(form.draft().postal_code_id(), Some("z1"));
}

#[tokio::test(start_paused = true)]
async fn complete_stored_address_needs_no_request() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let stored = StoredAddress {
        address1: Some("1 Elm St".into()),
        zip_code_id: Some("z1".into()),
        zip_code: Some("55001".into()),
        city_name: Some("Springfield".into()),
        state_name: Some("IL".into()),
        ..StoredAddress::default()
    };

    let form = form(&backend).with_draft(stored.into());
    form.settle().await;

    assert!(backend.locality_requests().is_empty());
    assert_eq!(form.draft().state(), "IL");
    assert!(form.validate().is_ok());
}

#[tokio::test(start_paused = true)]
async fn reset_returns_to_a_blank_form_but_keeps_the_cache() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);

    form.on_input("550");
    form.settle().await;
    form.select("z1", "55001");
    form.set_address_lines("1 Elm St", "Apt 2");
    form.settle().await;

    form.reset();
    assert_eq!(form.draft(), AddressDraft::new(None));
    assert!(form.candidates().is_empty());
    assert_eq!(form.search_phase(), SearchPhase::Idle);
    assert_eq!(form.locality_phase(), LocalityPhase::NoLocality);

    form.on_input("550");
    form.settle().await;
    assert_eq!(backend.searches(), ["550"]);
    assert_eq!(labels(&form.candidates()), ["55001", "55002"]);
}

#[tokio::test(start_paused = true)]
async fn draft_subscribers_see_the_resolved_locality() {
    let backend = Arc::new(ScriptedBackend::springfield());
    let form = form(&backend);
    let mut rx = form.subscribe_draft();

    form.select("z60601", "60601");
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().city(), "");

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().city(), "Chicago");
}
