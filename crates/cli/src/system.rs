//! Host environment for a desktop terminal.

use std::process::{Command, Stdio};

use stavax::{EnvironmentProbe, Error, Result};

/// A terminal is never inside the messaging app's container; deep links are
/// handed to the platform's URL opener.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnvironment;

impl SystemEnvironment {
	fn opener(url: &str) -> Command {
		if cfg!(target_os = "macos") {
			let mut cmd = Command::new("open");
			cmd.arg(url);
			cmd
		} else if cfg!(target_os = "windows") {
			let mut cmd = Command::new("cmd");
			cmd.args(["/C", "start", "", url]);
			cmd
		} else {
			let mut cmd = Command::new("xdg-open");
			cmd.arg(url);
			cmd
		}
	}
}

impl EnvironmentProbe for SystemEnvironment {
	fn is_host_container(&self) -> bool {
		false
	}

	fn is_mobile_container(&self) -> bool {
		false
	}

	fn open_deep_link(&self, url: &str) -> Result<()> {
		let mut cmd = Self::opener(url);
		tracing::debug!(%url, program = ?cmd.get_program(), "launching system opener");

		cmd.stdin(Stdio::null())
			.stdout(Stdio::null())
			.stderr(Stdio::null())
			.spawn()
			.map(|_| ())
			.map_err(|e| Error::Handoff(format!("could not launch {:?}: {}", cmd.get_program(), e)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn terminal_is_outside_host_container() {
		let env = SystemEnvironment;
		assert!(!env.is_host_container());
		assert!(!env.is_desktop_container());
		assert!(env.launch_params().is_none());
	}

	#[test]
	fn opener_receives_the_url() {
		let cmd = SystemEnvironment::opener("https://t.me/bot/app?startapp=sid%3D1");
		let args: Vec<_> = cmd.get_args().collect();
		assert_eq!(args.last().map(|a| a.to_str()), Some(Some("https://t.me/bot/app?startapp=sid%3D1")));
	}
}
