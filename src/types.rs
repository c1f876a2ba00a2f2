use serde::Serialize;

/// One trimmed line of input, expected to hold a JSON object.
pub type Record = String;

/// Command parameters shared by every record of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Params {
    pub exec_string: String,
}

/// Outcome of running the command once for a record (after any retries).
///
/// Serialized as one line of the structured sinks. Empty/zero fields are
/// omitted, `Succeeded` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExecutionResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub envvars: Vec<String>,
    pub params: Params,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub attempts: u32,
    pub succeeded: bool,
}

fn is_zero(v: &i32) -> bool {
    *v == 0
}

fn is_zero_u32(v: &u32) -> bool {
    *v == 0
}
