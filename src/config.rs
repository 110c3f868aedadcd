use colored::Colorize as _;

/// A compiler option that can be set in `hawk.toml`. All current options are booleans; The descriptor exists so that the
/// known options and their defaults live in one table instead of being scattered through the reader below.
pub struct CompilerOption {
	/// The name of the option as written in `hawk.toml`.
	name: &'static str,
	/// The value the option takes when `hawk.toml` is absent or doesn't mention it.
	default: bool,
}

impl CompilerOption {
	const fn boolean(name: &'static str) -> CompilerOption {
		CompilerOption { name, default: false }
	}

	const fn default(mut self, default: bool) -> Self {
		self.default = default;
		self
	}
}

/// The compiler options the reader recognizes. Keys found in `hawk.toml` that aren't in this table produce a warning and
/// are otherwise ignored.
static OPTIONS: phf::Map<&'static str, CompilerOption> = phf::phf_map! {
	"quiet" => CompilerOption::boolean("quiet"),
	"cache-bytecode" => CompilerOption::boolean("cache-bytecode").default(true),
	"developer-mode" => CompilerOption::boolean("developer-mode"),
};

/// The resolved compiler configuration for one run. This is read once at startup from an optional `hawk.toml` in the
/// working directory and never changes afterwards, so the fields are private and only accessible through the readers.
#[derive(Debug, Clone, Copy)]
pub struct Config {
	/// Whether to suppress the per-stage progress output.
	quiet: bool,
	/// Whether compiling a `.hawk` file also writes the compiled bytecode next to it as a `.bc` file.
	cache_bytecode: bool,
	/// Whether to print a disassembly of the compiled bytecode before running it.
	developer_mode: bool,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			quiet: OPTIONS.get("quiet").is_some_and(|option| option.default),
			cache_bytecode: OPTIONS.get("cache-bytecode").is_some_and(|option| option.default),
			developer_mode: OPTIONS.get("developer-mode").is_some_and(|option| option.default),
		}
	}
}

impl Config {
	/// Loads the configuration from `hawk.toml` in the current working directory. A missing file yields the defaults. A
	/// file that isn't valid TOML prints a warning with an example of the expected format and also yields the defaults;
	/// An invalid configuration never stops a compile.
	#[must_use]
	pub fn load() -> Self {
		let Ok(contents) = std::fs::read_to_string("hawk.toml") else {
			return Self::default();
		};

		let document = match contents.parse::<toml_edit::DocumentMut>() {
			Ok(document) => document,
			Err(error) => {
				eprintln!("{} hawk.toml is not valid TOML and will be ignored: {error}", "Warning:".bold().yellow());
				eprintln!(
					"{}",
					unindent::unindent(
						"
						A hawk.toml file looks like this:

						    quiet = false
						    cache-bytecode = true
						    developer-mode = false
						"
					)
					.dimmed()
				);
				return Self::default();
			},
		};

		let mut config = Self::default();
		for (key, item) in document.iter() {
			let Some(option) = OPTIONS.get(key) else {
				eprintln!("{} No compiler option called \"{}\" exists; Ignoring it.", "Warning:".bold().yellow(), key.bold().red());
				continue;
			};

			let Some(value) = item.as_bool() else {
				eprintln!(
					"{} The option {} must be either {} or {}; Ignoring it.",
					"Warning:".bold().yellow(),
					option.name.bold().yellow(),
					"true".bold().cyan(),
					"false".bold().cyan()
				);
				continue;
			};

			match option.name {
				"quiet" => config.quiet = value,
				"cache-bytecode" => config.cache_bytecode = value,
				"developer-mode" => config.developer_mode = value,
				_ => {},
			}
		}

		config
	}

	/// Returns whether the per-stage progress output should be suppressed.
	#[must_use]
	pub const fn quiet(&self) -> bool {
		self.quiet
	}

	/// Returns whether compiling a `.hawk` file should also write the bytecode next to it as a `.bc` file.
	#[must_use]
	pub const fn cache_bytecode(&self) -> bool {
		self.cache_bytecode
	}

	/// Returns whether a disassembly of the compiled bytecode should be printed before it runs.
	#[must_use]
	pub const fn developer_mode(&self) -> bool {
		self.developer_mode
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_come_from_the_option_table() {
		let config = Config::default();
		assert!(!config.quiet());
		assert!(config.cache_bytecode());
		assert!(!config.developer_mode());
	}
}
