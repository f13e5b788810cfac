//! End-to-End Integration Tests for the supply schedule tools
//!
//! Tests complete workflows as an MCP client drives them:
//! - Generate → encode → decode pipeline through JSON payloads
//! - Canonical 2-day Base auction reference values
//! - Pre-bid period handling
//! - Overflow and parameter errors surfacing as structured envelopes

use supply_schedule::schedule::StructuredError;
use supply_schedule::tools::{
    decode_supply_schedule, encode_supply_schedule, generate_supply_schedule,
    DecodeScheduleRequest, EncodeScheduleRequest, GenerateScheduleRequest,
};
use supply_schedule::{ScheduleConfig, ScheduleGenerator, TOTAL_TARGET};

/// Reference time boundaries for 86400 blocks, 12 steps, alpha 1.2
const CANONICAL_TIMES: [f64; 13] = [
    0.0000, 0.1261, 0.2247, 0.3150, 0.4003, 0.4821, 0.5612, 0.6382, 0.7133, 0.7868, 0.8590,
    0.9301, 1.0000,
];

fn generate(json: &str) -> serde_json::Value {
    let req: GenerateScheduleRequest = serde_json::from_str(json).expect("valid request JSON");
    let response =
        generate_supply_schedule(&ScheduleGenerator::default(), req).expect("generation succeeds");
    serde_json::to_value(&response).unwrap()
}

fn total_mps(schedule: &serde_json::Value) -> u64 {
    schedule
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["mps"].as_u64().unwrap() * p["blockDelta"].as_u64().unwrap())
        .sum()
}

#[test]
fn test_canonical_schedule() {
    let response = generate(r#"{"auction_blocks": 86400}"#);
    let schedule = &response["schedule"];
    let phases = schedule.as_array().unwrap();

    assert_eq!(response["total_phases"], 13);
    assert_eq!(total_mps(schedule), TOTAL_TARGET);

    // Block boundaries within a block of the reference curve (values are 4-decimal)
    let mut position = 0i64;
    for (i, phase) in phases.iter().take(12).enumerate() {
        position += phase["blockDelta"].as_i64().unwrap();
        let expected = (CANONICAL_TIMES[i + 1] * 86_400.0).round() as i64;
        assert!(
            (position - expected).abs() <= 5,
            "boundary {} at {} expected near {}",
            i + 1,
            position,
            expected
        );
    }

    // Each step releases ~5.8333% of supply
    for phase in phases.iter().take(12) {
        let tokens = phase["mps"].as_u64().unwrap() * phase["blockDelta"].as_u64().unwrap();
        let pct = tokens as f64 / TOTAL_TARGET as f64 * 100.0;
        assert!((pct - 5.8333).abs() < 0.5, "step share {}", pct);
    }

    let final_pct = response["summary"]["final_block_percentage"].as_f64().unwrap();
    assert!((25.0..=35.0).contains(&final_pct));
    assert_eq!(response["summary"]["total_mps"], TOTAL_TARGET);
    assert_eq!(response["summary"]["target_mps"], TOTAL_TARGET);
}

#[test]
fn test_prebid_schedule() {
    let response = generate(r#"{"auction_blocks": 86400, "prebid_blocks": 43200}"#);
    let schedule = &response["schedule"];

    assert_eq!(schedule[0]["mps"], 0);
    assert_eq!(schedule[0]["blockDelta"], 43_200);
    assert_eq!(response["prebid_blocks"], 43_200);
    assert_eq!(response["total_phases"], 14);
    assert_eq!(total_mps(schedule), TOTAL_TARGET);
}

#[test]
fn test_generate_encode_decode_pipeline() {
    let response = generate(
        r#"{"auction_blocks": 43200, "prebid_blocks": 600, "round_to_nearest": 100}"#,
    );

    // Feed the generated JSON straight back in, as a client would
    let encode_req: EncodeScheduleRequest =
        serde_json::from_value(serde_json::json!({ "schedule": response["schedule"] })).unwrap();
    let encoded = encode_supply_schedule(encode_req).unwrap();
    assert_eq!(encoded.phase_count, 14);
    assert_eq!(encoded.byte_length, 14 * 8);
    assert_eq!(encoded.encoded.len(), 2 + 14 * 16);

    let decoded = decode_supply_schedule(DecodeScheduleRequest {
        encoded: encoded.encoded,
    })
    .unwrap();
    assert_eq!(decoded.total_mps, TOTAL_TARGET.to_string());
    assert_eq!(
        serde_json::to_value(&decoded.schedule).unwrap(),
        response["schedule"]
    );
}

#[test]
fn test_basic_encoding() {
    let req: EncodeScheduleRequest = serde_json::from_str(
        r#"{"schedule": [{"mps": 1000, "blockDelta": 5000}, {"mps": 2000, "blockDelta": 3000}]}"#,
    )
    .unwrap();
    let encoded = encode_supply_schedule(req).unwrap().encoded;

    assert!(encoded.starts_with("0x"));
    assert_eq!(encoded.len(), 2 + 32);
    assert_eq!(&encoded[2..18], format!("{:016x}", (1000u64 << 40) | 5000));
}

#[test]
fn test_maximum_values_encoding() {
    let req: EncodeScheduleRequest = serde_json::from_str(
        r#"{"schedule": [{"mps": 16777215, "blockDelta": 1099511627775}]}"#,
    )
    .unwrap();
    let encoded = encode_supply_schedule(req).unwrap();
    assert_eq!(encoded.encoded, "0xffffffffffffffff");
}

#[test]
fn test_overflow_errors_are_structured() {
    let cases = [
        (r#"{"schedule": [{"mps": 16777216, "blockDelta": 1000}]}"#, "mps", 24),
        (r#"{"schedule": [{"mps": 1000, "blockDelta": 1099511627776}]}"#, "blockDelta", 40),
    ];

    for (json, field, bits) in cases {
        let req: EncodeScheduleRequest = serde_json::from_str(json).unwrap();
        let err = encode_supply_schedule(req).unwrap_err();
        assert!(err.to_string().contains(&format!("exceeds {}-bit max", bits)));

        let structured: StructuredError = serde_json::from_str(&err.to_structured_json()).unwrap();
        assert_eq!(structured.code, "FIELD_OVERFLOW");
        assert_eq!(structured.context["field"], field);
        assert_eq!(structured.context["phase_index"], 0);
        assert!(!structured.retryable);
    }
}

#[test]
fn test_invalid_parameters_are_structured() {
    let generator = ScheduleGenerator::default();
    for json in [
        r#"{"auction_blocks": 0}"#,
        r#"{"auction_blocks": 100, "num_steps": 0}"#,
        r#"{"auction_blocks": 100, "final_block_pct": 0.0}"#,
        r#"{"auction_blocks": 100, "alpha": -1.0}"#,
        r#"{"auction_blocks": 100, "round_to_nearest": 0}"#,
    ] {
        let req: GenerateScheduleRequest = serde_json::from_str(json).unwrap();
        let err = generate_supply_schedule(&generator, req).unwrap_err();
        assert_eq!(err.to_structured().code, "INVALID_PARAMETER", "{}", json);
    }
}

#[test]
fn test_overshooting_schedule_reports_totals() {
    // A tiny target makes the 1-mps floor exceed it
    let generator = ScheduleGenerator::new(ScheduleConfig {
        total_target: 10,
        ..Default::default()
    });
    let req: GenerateScheduleRequest =
        serde_json::from_str(r#"{"auction_blocks": 12, "alpha": 1.0}"#).unwrap();
    let err = generate_supply_schedule(&generator, req).unwrap_err();

    let structured = err.to_structured();
    assert_eq!(structured.code, "INVALID_SCHEDULE");
    assert_eq!(structured.context["total_mps"], "12");
    assert_eq!(structured.context["target_mps"], 10);
    assert!(structured.recovery_action.contains("round_to_nearest"));
}

#[test]
fn test_malformed_decode_input() {
    for encoded in ["0x1234", "not hex", "0x000003e80000138"] {
        let err = decode_supply_schedule(DecodeScheduleRequest {
            encoded: encoded.to_string(),
        })
        .unwrap_err();
        assert_eq!(err.to_structured().code, "MALFORMED_ENCODING", "{}", encoded);
    }
}
