use super::*;

#[test]
fn result_builder_success() {
	let result: CommandResult<String> = ResultBuilder::new("link").data("https://t.me/bot/app".into()).build();

	assert!(result.ok);
	assert_eq!(result.command, "link");
	assert_eq!(result.schema_version, Some(SCHEMA_VERSION));
	assert!(result.error.is_none());
	assert!(result.timings.is_some());
}

#[test]
fn result_builder_error() {
	let result: CommandResult<String> = ResultBuilder::new("session new")
		.error(ErrorCode::SessionError, "Failed to create wallet session")
		.build();

	assert!(!result.ok);
	assert!(result.data.is_none());
	assert_eq!(result.error.as_ref().unwrap().code, ErrorCode::SessionError);
}

#[test]
fn result_without_data_is_not_ok() {
	let result: CommandResult<()> = ResultBuilder::new("device-id").build();
	assert!(!result.ok);
}

#[test]
fn error_code_display_matches_serde() {
	assert_eq!(ErrorCode::SmartSessionError.to_string(), "SMART_SESSION_ERROR");
	assert_eq!(ErrorCode::ConfigError.to_string(), "CONFIG_ERROR");
	assert_eq!(
		serde_json::to_value(ErrorCode::HandoffError).unwrap(),
		serde_json::json!("HANDOFF_ERROR")
	);
}

#[test]
fn output_format_parse() {
	assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
	assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
	assert!("toml".parse::<OutputFormat>().is_err());
}

#[test]
fn envelope_uses_camel_case_and_skips_empty_fields() {
	let result: CommandResult<serde_json::Value> = ResultBuilder::new("device-id")
		.data(serde_json::json!({ "deviceId": "abc" }))
		.build();
	let value = serde_json::to_value(&result).unwrap();

	assert_eq!(value["schemaVersion"], 1);
	assert_eq!(value["data"]["deviceId"], "abc");
	assert!(value.get("error").is_none());
	assert!(value["timings"]["durationMs"].is_u64());
}
