// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use khora_resolver::prelude::*;

const FRAME: Duration = Duration::from_millis(16);

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A hub whose filesystem provider only sees `root`.
fn hub_rooted_at(root: &Path) -> Result<DataHub> {
    DataHub::from_config(ResolverConfig {
        filesystem: FilesystemSettings {
            enabled: true,
            root: Some(root.to_path_buf()),
        },
        ..ResolverConfig::default()
    })
}

/// Advances the hub until `request` settles, giving up after `max_frames`.
fn simulate_until_settled(
    hub: &mut DataHub,
    request: RecordId,
    max_frames: usize,
) -> Result<RequestStatus> {
    for _ in 0..max_frames {
        hub.advance(FRAME)?;
        match hub.status(request) {
            Some(status) if status.is_settled() => return Ok(status),
            Some(_) => {}
            None => bail!("request {request} disappeared"),
        }
    }
    bail!("request {request} did not settle within {max_frames} frames")
}

fn text(hub: &DataHub, request: RecordId) -> Option<&str> {
    hub.world().read_utf8(request)
}

#[test]
fn reads_text_written_to_a_source_record() -> Result<()> {
    init_logger();

    // --- 1. ARRANGE ---
    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    let file = hub
        .world_mut()
        .spawn_source(Address::new("test.txt")?, Vec::new());
    hub.world_mut().write_utf8(file, "Hello, World!");

    let request = hub.request("test.txt")?;

    // --- 2. ACT ---
    let status = simulate_until_settled(&mut hub, request, 10)?;

    // --- 3. ASSERT ---
    assert_eq!(status, RequestStatus::Loaded);
    assert_eq!(text(&hub, request), Some("Hello, World!"));
    Ok(())
}

#[test]
fn finds_record_by_plain_name() -> Result<()> {
    init_logger();

    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    let contents = format!("tomato-{}", std::process::id());
    hub.world_mut()
        .spawn_source(Address::new("tomato")?, contents.clone().into_bytes());

    let request = hub.request("tomato")?;
    assert_eq!(simulate_until_settled(&mut hub, request, 10)?, RequestStatus::Loaded);
    assert_eq!(text(&hub, request), Some(contents.as_str()));
    Ok(())
}

#[test]
fn missing_data_keeps_loading_until_the_caller_gives_up() -> Result<()> {
    init_logger();

    // Default timeout is 5s; the caller stops polling after 800ms.
    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    let request = hub.request("tomato")?;

    for _ in 0..50 {
        hub.advance(FRAME)?;
    }

    assert_eq!(hub.status(request), Some(RequestStatus::Loading));
    assert_eq!(hub.bytes(request), None);
    Ok(())
}

#[test]
fn missing_data_times_out_as_not_found() -> Result<()> {
    init_logger();

    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    let request = hub.request_with_timeout("tomato", Duration::from_millis(100))?;

    assert_eq!(
        simulate_until_settled(&mut hub, request, 20)?,
        RequestStatus::NotFound
    );
    assert_eq!(hub.bytes(request), None);
    assert_eq!(hub.datum(request), None);
    Ok(())
}

#[test]
fn wildcards_pick_the_matching_extension() -> Result<()> {
    init_logger();

    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    for (address, contents) in [
        ("Assets/Materials/unlit.mat", "material"),
        ("Assets/Materials/unlit.json", "json"),
        ("Assets/Materials/unlit.shader", "shader"),
        ("Assets/Materials/unlit.txt", "text"),
    ] {
        hub.world_mut()
            .spawn_source(Address::new(address)?, contents.as_bytes().to_vec());
    }

    let material = hub.request("*/unlit.mat")?;
    let any_shader = hub.request("*.shader")?;

    assert_eq!(simulate_until_settled(&mut hub, material, 10)?, RequestStatus::Loaded);
    assert_eq!(simulate_until_settled(&mut hub, any_shader, 10)?, RequestStatus::Loaded);
    assert_eq!(text(&hub, material), Some("material"));
    assert_eq!(text(&hub, any_shader), Some("shader"));
    Ok(())
}

#[test]
fn loads_from_the_filesystem() -> Result<()> {
    init_logger();

    let dir = tempfile::tempdir()?;
    fs::create_dir(dir.path().join("Assets"))?;
    fs::write(
        dir.path().join("Assets/TestData.txt"),
        "an abacus is a counting frame",
    )?;
    let mut hub = hub_rooted_at(dir.path())?;

    let request = hub.request("Assets/TestData.txt")?;
    assert_eq!(simulate_until_settled(&mut hub, request, 10)?, RequestStatus::Loaded);
    assert!(text(&hub, request).is_some_and(|t| t.contains("abacus")));
    Ok(())
}

#[test]
fn loads_embedded_files_listed_in_the_config() -> Result<()> {
    init_logger();

    // --- 1. ARRANGE ---
    let dir = tempfile::tempdir()?;
    let embedded_path = dir.path().join("embedded.txt");
    fs::write(&embedded_path, "i am an embedded resource")?;
    let config_path = dir.path().join("resolver.ron");
    fs::write(
        &config_path,
        format!(
            r#"(
                default_timeout_ms: 1000,
                filesystem: (enabled: false),
                embedded: [(address: "Assets/EmbeddedTestData.txt", path: {:?})],
            )"#,
            embedded_path.display().to_string()
        ),
    )?;

    // --- 2. ACT ---
    let mut hub = DataHub::from_config(ResolverConfig::load(&config_path)?)?;
    let request = hub.request("*/EmbeddedTestData.txt")?;
    let status = simulate_until_settled(&mut hub, request, 10)?;

    // --- 3. ASSERT ---
    assert_eq!(status, RequestStatus::Loaded);
    assert!(text(&hub, request).is_some_and(|t| t.contains("i am an embedded resource")));
    Ok(())
}

#[test]
fn missing_embedded_file_fails_hub_construction() {
    init_logger();

    let config = ResolverConfig {
        embedded: vec![EmbeddedEntry {
            address: Address::from_static("missing"),
            path: "/definitely/not/here.bin".into(),
        }],
        ..ResolverConfig::default()
    };

    let err = match DataHub::from_config(config) {
        Ok(_) => panic!("the embedded file does not exist"),
        Err(err) => err,
    };
    assert!(format!("{err:#}").contains("missing"));
}

#[test]
fn duplicate_registration_keeps_the_first_bytes() -> Result<()> {
    init_logger();

    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    let address = Address::new("Shaders/default.shader")?;

    assert!(hub.register(b"first", address));
    assert!(!hub.register(b"second".to_vec(), address));

    assert_eq!(
        hub.resolve("Shaders/default.shader")?.into_bytes(),
        Some(b"first".to_vec())
    );
    Ok(())
}

#[test]
fn invalid_addresses_never_create_requests() -> Result<()> {
    init_logger();

    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    let too_long = "a".repeat(256);

    for address in ["", "*", "*/", "caf\u{e9}", too_long.as_str()] {
        let result = hub.request(address);
        assert!(
            matches!(result, Err(ResolveError::InvalidAddress { .. })),
            "{address:?} should be rejected, got {result:?}"
        );
    }
    assert!(hub.world().is_empty());
    Ok(())
}

#[test]
fn bumping_version_reloads_a_loaded_request() -> Result<()> {
    init_logger();

    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    let source = hub
        .world_mut()
        .spawn_source(Address::new("settings")?, b"v1".to_vec());
    let request = hub.request("settings")?;
    simulate_until_settled(&mut hub, request, 10)?;
    assert_eq!(hub.datum(request).map(|d| d.revision), Some(1));

    hub.world_mut().write_utf8(source, "v2");
    assert_eq!(hub.bump_version(request), Some(1));
    hub.advance(FRAME)?;

    assert_eq!(hub.status(request), Some(RequestStatus::Loaded));
    assert_eq!(text(&hub, request), Some("v2"));
    assert_eq!(hub.datum(request).map(|d| d.revision), Some(2));
    Ok(())
}

#[test]
fn bumping_version_retries_a_request_that_was_not_found() -> Result<()> {
    init_logger();

    // --- 1. ARRANGE ---
    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    let request = hub.request_with_timeout("late", Duration::from_millis(32))?;
    assert_eq!(
        simulate_until_settled(&mut hub, request, 10)?,
        RequestStatus::NotFound
    );
    hub.world_mut()
        .spawn_source(Address::new("late")?, b"arrived".to_vec());

    // --- 2. ACT ---
    hub.advance(FRAME)?;
    let before_bump = hub.status(request);
    hub.bump_version(request);
    hub.advance(FRAME)?;

    // --- 3. ASSERT ---
    assert_eq!(before_bump, Some(RequestStatus::NotFound));
    assert_eq!(hub.status(request), Some(RequestStatus::Loaded));
    assert_eq!(text(&hub, request), Some("arrived"));
    assert!(hub.drain_events().is_empty());
    Ok(())
}

#[test]
fn events_report_completion_when_enabled() -> Result<()> {
    init_logger();

    let mut hub = DataHub::from_config(ResolverConfig {
        filesystem: FilesystemSettings {
            enabled: false,
            root: None,
        },
        emit_events: true,
        ..ResolverConfig::default()
    })?;
    hub.register("bytes", Address::from_static("evented"));
    let request = hub.request("evented")?;

    hub.advance(FRAME)?;

    let events = hub.drain_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, DataEventKind::Loading);
    assert_eq!(
        events[1],
        DataEvent {
            record: request,
            address: Address::from_static("evented"),
            kind: DataEventKind::Loaded { provider: "Embedded" },
        }
    );
    Ok(())
}

#[test]
fn events_are_silent_by_default() -> Result<()> {
    init_logger();

    let dir = tempfile::tempdir()?;
    let mut hub = hub_rooted_at(dir.path())?;
    hub.register("bytes", Address::from_static("quiet"));
    hub.request("quiet")?;
    hub.advance(FRAME)?;

    assert!(hub.events().is_empty());
    assert!(hub.report_status().message.contains("loaded_total=1"));
    Ok(())
}
