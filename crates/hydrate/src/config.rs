/// Global automatic-mapping policy.
///
/// Nested schemas are stricter than top-level ones: a nested schema is only
/// auto-mapped under `Full`, while a top-level schema is auto-mapped under
/// anything but `None`. A per-schema override on the mapping schema wins over
/// the global policy either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoMapPolicy {
    /// Never map unmapped columns automatically.
    None,

    /// Auto-map top-level schemas only.
    #[default]
    Partial,

    /// Auto-map top-level and nested schemas.
    Full,
}

/// What to do with a column that automatic mapping cannot place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownColumnPolicy {
    /// Silently skip the column.
    #[default]
    Ignore,

    /// Log a warning and skip the column.
    Warn,

    /// Fail the whole materialization.
    Fail,
}

/// Engine configuration.
///
/// Plain builder-style setters; no file or environment loading.
#[derive(Debug, Clone)]
pub struct Config {
    pub auto_mapping: AutoMapPolicy,
    pub unknown_columns: UnknownColumnPolicy,

    /// Bind explicit nulls to nullable destination properties instead of
    /// skipping them.
    pub bind_nulls: bool,

    /// Return an empty instance for a row whose mapped columns are all null
    /// instead of reporting absence.
    pub instance_for_empty_row: bool,

    /// Normalize snake_case column names to camelCase during automatic
    /// mapping.
    pub snake_to_camel: bool,

    /// Permit a non-default row window on statements with nested mappings.
    pub allow_row_window_on_nested: bool,

    /// Permit a caller-supplied consumer on nested statements not declared
    /// ordered.
    pub allow_consumer_on_unordered_nested: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            auto_mapping: AutoMapPolicy::default(),
            unknown_columns: UnknownColumnPolicy::default(),
            bind_nulls: false,
            instance_for_empty_row: false,
            snake_to_camel: false,
            allow_row_window_on_nested: false,
            allow_consumer_on_unordered_nested: false,
        }
    }
}

impl Config {
    pub fn new() -> Config {
        Config::default()
    }

    pub fn auto_mapping(mut self, policy: AutoMapPolicy) -> Self {
        self.auto_mapping = policy;
        self
    }

    pub fn unknown_columns(mut self, policy: UnknownColumnPolicy) -> Self {
        self.unknown_columns = policy;
        self
    }

    pub fn bind_nulls(mut self, enabled: bool) -> Self {
        self.bind_nulls = enabled;
        self
    }

    pub fn instance_for_empty_row(mut self, enabled: bool) -> Self {
        self.instance_for_empty_row = enabled;
        self
    }

    pub fn snake_to_camel(mut self, enabled: bool) -> Self {
        self.snake_to_camel = enabled;
        self
    }

    pub fn allow_row_window_on_nested(mut self, enabled: bool) -> Self {
        self.allow_row_window_on_nested = enabled;
        self
    }

    pub fn allow_consumer_on_unordered_nested(mut self, enabled: bool) -> Self {
        self.allow_consumer_on_unordered_nested = enabled;
        self
    }
}
