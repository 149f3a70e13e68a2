use serde::Serialize;
use stavax_runtime::DeviceIdentity;

use super::CommandContext;
use crate::error::Result;
use crate::output::{ResultBuilder, print_result};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceIdData {
	device_id: String,
	storage: String,
}

pub fn show(ctx: &CommandContext) -> Result<()> {
	let storage = ctx.storage();
	let path = storage.path().display().to_string();
	let device_id = DeviceIdentity::new(storage).get()?;

	let result = ResultBuilder::new("device-id")
		.data(DeviceIdData { device_id, storage: path })
		.build();
	print_result(&result, ctx.format());
	Ok(())
}
