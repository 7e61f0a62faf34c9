//! Architecture contract tests.

mod support;

use support::architecture::{
    find_lines_containing, find_lines_containing_except_dirs, find_lines_containing_except_files,
    find_lines_containing_outside_tests, find_non_export_lines_in_mod_files, path_exists,
    read_relative,
};

#[test]
fn domain_has_no_framework_or_outer_layer_imports() {
    let hits = find_lines_containing(
        "src/domain",
        &[
            "crate::adapter",
            "crate::infrastructure",
            "crate::application",
            "crate::port",
            "tokio::",
            "reqwest::",
            "diesel::",
            "teloxide::",
        ],
    );

    assert!(
        hits.is_empty(),
        "found forbidden imports in domain layer: {hits:#?}"
    );
}

#[test]
fn mod_rs_is_export_only() {
    let violations = find_non_export_lines_in_mod_files("src");
    assert!(
        violations.is_empty(),
        "found non-export content in mod.rs files: {violations:#?}"
    );
}

#[test]
fn application_layer_has_no_direct_adapter_imports() {
    let hits = find_lines_containing_outside_tests(
        "src/application",
        &["crate::adapter::", "crate::infrastructure::"],
    );
    assert!(
        hits.is_empty(),
        "application layer should only reach the outside through ports: {hits:#?}"
    );
}

#[test]
fn ports_depend_only_on_domain() {
    let hits = find_lines_containing(
        "src/port",
        &["crate::adapter", "crate::application", "crate::infrastructure"],
    );
    assert!(
        hits.is_empty(),
        "ports should describe contracts in domain terms: {hits:#?}"
    );
}

#[test]
fn telegram_sdk_stays_in_telegram_adapters() {
    let hits = find_lines_containing_except_dirs(
        "src",
        &["teloxide::"],
        &[
            "src/adapter/outbound/telegram/",
            "src/adapter/inbound/telegram/",
        ],
    );
    assert!(
        hits.is_empty(),
        "teloxide should only be used by the telegram adapters: {hits:#?}"
    );
}

#[test]
fn diesel_stays_in_sqlite_adapter() {
    let hits = find_lines_containing_except_dirs(
        "src",
        &["diesel::", "use diesel"],
        &["src/adapter/outbound/sqlite/"],
    );
    assert!(
        hits.is_empty(),
        "diesel should only be used by the sqlite adapter: {hits:#?}"
    );
}

#[test]
fn http_client_stays_in_llm_adapters() {
    let hits = find_lines_containing_except_files(
        "src",
        &["reqwest::"],
        &[
            "src/adapter/outbound/llm/anthropic.rs",
            "src/adapter/outbound/llm/openai.rs",
            "src/error.rs",
        ],
    );
    assert!(
        hits.is_empty(),
        "reqwest should only be used by completion clients: {hits:#?}"
    );
}

#[test]
fn completion_contract_lives_in_outbound_port() {
    assert!(
        path_exists("src/port/outbound/llm.rs"),
        "completion trait contract should live under port/outbound"
    );

    let advice = read_relative("src/application/copilot/advice.rs");
    assert!(
        advice.contains("crate::port::outbound::llm::Llm"),
        "advisor should depend on the outbound llm port contract"
    );
    assert!(
        !advice.contains("crate::adapter::outbound::llm"),
        "advisor should not depend on llm adapter modules directly"
    );
}

#[test]
fn keyspace_is_the_only_place_keys_are_spelled() {
    let hits = find_lines_containing_outside_tests(
        "src/application",
        &["\"copilot:", "\"digest:", "\"ingest:", "\"ai:", "\"run:"],
    )
    .into_iter()
    .filter(|(path, _, _)| path != "src/application/keyspace.rs")
    .collect::<Vec<_>>();
    assert!(
        hits.is_empty(),
        "key-value keys should be built by application/keyspace.rs: {hits:#?}"
    );
}

#[test]
fn composition_root_lives_in_infrastructure() {
    assert!(path_exists("src/infrastructure/bootstrap.rs"));
    let hits = find_lines_containing_outside_tests(
        "src/adapter/outbound",
        &["crate::infrastructure::"],
    );
    assert!(
        hits.is_empty(),
        "outbound adapters should not reach into the composition root: {hits:#?}"
    );
}
