// Copyright 2018 The Grin Developers
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

//! Logging setup. Configuration loading and the choice of sinks belongs to
//! the embedding node (out of scope here); this module only wires the
//! `log` facade to `log4rs` given an already-parsed `LoggingConfig`.

use std::sync::Once;

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::types::{LogLevel, LoggingConfig};

static INIT: Once = Once::new();

fn to_level_filter(level: &LogLevel) -> LevelFilter {
	match level {
		LogLevel::Error => LevelFilter::Error,
		LogLevel::Warning => LevelFilter::Warn,
		LogLevel::Info => LevelFilter::Info,
		LogLevel::Debug => LevelFilter::Debug,
		LogLevel::Trace => LevelFilter::Trace,
	}
}

/// Initializes the global logger from a `LoggingConfig`. Safe to call more
/// than once; only the first call takes effect.
pub fn init_logger(config: &LoggingConfig) {
	INIT.call_once(|| {
		let pattern = "{d(%Y-%m-%d %H:%M:%S%.3f)} {l:<5} {m}{n}";
		let mut builder = Config::builder();
		let mut root = Root::builder();

		if config.log_to_stdout {
			let stdout = ConsoleAppender::builder()
				.encoder(Box::new(PatternEncoder::new(pattern)))
				.build();
			builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
			root = root.appender("stdout");
		}

		if config.log_to_file {
			if let Ok(file) = FileAppender::builder()
				.encoder(Box::new(PatternEncoder::new(pattern)))
				.append(config.log_file_append)
				.build(&config.log_file_path)
			{
				builder = builder.appender(Appender::builder().build("logfile", Box::new(file)));
				root = root.appender("logfile");
			}
		}

		let level =
			to_level_filter(&config.stdout_log_level).max(to_level_filter(&config.file_log_level));
		if let Ok(cfg) = builder.build(root.build(level)) {
			let _ = log4rs::init_config(cfg);
		}
	});
}

/// Initializes a simple stdout-only logger, for tests.
pub fn init_test_logger() {
	init_logger(&LoggingConfig {
		log_to_file: false,
		stdout_log_level: LogLevel::Debug,
		..LoggingConfig::default()
	});
}
