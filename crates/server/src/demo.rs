// Demo catalogs served by the a2t-server binary

use a2t_core::{
    A2tResult, Capabilities, Group, GroupedProvider, MetaResponse, SimpleProvider, Tool,
    ToolError, ToolOutput, ToolParams,
};
use chrono::{FixedOffset, Local, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct BinaryArgs {
    a: f64,
    b: f64,
}

#[derive(Debug, Deserialize)]
struct TextArgs {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    location: String,
}

#[derive(Debug, Deserialize)]
struct TimeArgs {
    #[serde(default)]
    timezone: Option<String>,
}

fn parse_args<T: serde::de::DeserializeOwned>(params: ToolParams) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(params))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

fn binary_number_tool(name: &str, description: &str) -> Tool {
    Tool::new(name, description)
        .with_property("a", "number", "First number", true)
        .with_property("b", "number", "Second number", true)
}

async fn add(params: ToolParams) -> Result<ToolOutput, ToolError> {
    let args: BinaryArgs = parse_args(params)?;
    Ok(ToolOutput::new(args.a + args.b))
}

async fn multiply(params: ToolParams) -> Result<ToolOutput, ToolError> {
    let args: BinaryArgs = parse_args(params)?;
    Ok(ToolOutput::new(args.a * args.b))
}

async fn get_weather(params: ToolParams) -> Result<ToolOutput, ToolError> {
    let args: WeatherArgs = parse_args(params)?;
    // Simulated weather data
    Ok(ToolOutput::new(serde_json::json!({
        "location": args.location,
        "temperature": 72,
        "condition": "Sunny",
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// Accepts "UTC", "Local", an IANA zone such as "America/New_York" or a
/// fixed offset such as "+05:30"
async fn get_time(params: ToolParams) -> Result<ToolOutput, ToolError> {
    let args: TimeArgs = parse_args(params)?;
    let timezone = args.timezone.unwrap_or_else(|| "UTC".to_string());

    let time = match timezone.as_str() {
        "UTC" | "Etc/UTC" => Utc::now().to_rfc3339(),
        "Local" => Local::now().to_rfc3339(),
        other => match other.parse::<Tz>() {
            Ok(zone) => Utc::now().with_timezone(&zone).to_rfc3339(),
            Err(_) => {
                let offset: FixedOffset = other
                    .parse()
                    .map_err(|_| ToolError::failed(format!("invalid timezone: {}", other)))?;
                Utc::now().with_timezone(&offset).to_rfc3339()
            }
        },
    };

    Ok(ToolOutput::new(serde_json::json!({
        "timezone": timezone,
        "time": time,
    })))
}

async fn uppercase(params: ToolParams) -> Result<ToolOutput, ToolError> {
    let args: TextArgs = parse_args(params)?;
    Ok(ToolOutput::new(args.text.to_uppercase()))
}

async fn reverse(params: ToolParams) -> Result<ToolOutput, ToolError> {
    let args: TextArgs = parse_args(params)?;
    Ok(ToolOutput::new(args.text.chars().rev().collect::<String>()))
}

/// Announces a `subtract` tool through a `tools_added` meta response
async fn discover_math_tools(_params: ToolParams) -> Result<ToolOutput, ToolError> {
    let subtract = binary_number_tool("subtract", "Subtract two numbers").with_group("math");

    Ok(ToolOutput::new("Discovered 1 new math tool")
        .with_meta(MetaResponse::tools_added([subtract])))
}

/// Flat catalog: a calculator, weather and time
pub fn simple(capabilities: Capabilities) -> A2tResult<SimpleProvider> {
    let provider = SimpleProvider::new(capabilities);

    provider.register_tool(
        binary_number_tool("add", "Add two numbers together"),
        add,
    )?;
    provider.register_tool(
        Tool::new("get_weather", "Get current weather for a location").with_property(
            "location",
            "string",
            "City name or coordinates",
            true,
        ),
        get_weather,
    )?;
    provider.register_tool(
        Tool::new("get_time", "Get current time in a timezone").with_property(
            "timezone",
            "string",
            "Timezone name (e.g. America/New_York) or offset such as +05:30",
            false,
        ),
        get_time,
    )?;

    Ok(provider)
}

/// Grouped catalog with math and string tools
pub fn advanced(capabilities: Capabilities) -> A2tResult<GroupedProvider> {
    let provider = GroupedProvider::new(capabilities);

    provider.register_group(Group::new("math", "Mathematics", "Mathematical operations"))?;
    provider.register_group(Group::new(
        "string",
        "String Operations",
        "Tools for manipulating strings",
    ))?;

    provider.register_tool(
        binary_number_tool("add", "Add two numbers").with_group("math"),
        add,
    )?;
    provider.register_tool(
        binary_number_tool("multiply", "Multiply two numbers").with_group("math"),
        multiply,
    )?;
    provider.register_tool(
        Tool::new("discover_math_tools", "Discover additional math tools").with_group("math"),
        discover_math_tools,
    )?;

    provider.register_tool(
        Tool::new("uppercase", "Convert text to uppercase")
            .with_property("text", "string", "Text to convert", true)
            .with_group("string"),
        uppercase,
    )?;
    provider.register_tool(
        Tool::new("reverse", "Reverse a string")
            .with_property("text", "string", "Text to reverse", true)
            .with_group("string"),
        reverse,
    )?;

    Ok(provider)
}
