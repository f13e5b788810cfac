//! MCP Server for CCA Supply Schedules
//!
//! Provides three tools for Continuous Clearing Auction deployments:
//! - `generate_supply_schedule`: Convex-curve schedule with an exact 1e7 MPS total
//! - `encode_supply_schedule`: Packed bytes for the auction contract
//! - `decode_supply_schedule`: Unpack encoded bytes for inspection
//!
//! # Usage
//!
//! ```bash
//! # Standard MCP mode
//! supply-schedule-mcp
//!
//! # Custom defaults
//! SUPPLY_SCHEDULE_NUM_STEPS=10 supply-schedule-mcp --alpha 1.5
//! ```

use anyhow::Result;
use clap::Parser;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use supply_schedule::schedule::{Phase, ScheduleConfig, ScheduleGenerator};
use supply_schedule::tools;
use tokio::io::{stdin, stdout};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Default number of steps (overrides SUPPLY_SCHEDULE_NUM_STEPS)
    #[arg(long)]
    num_steps: Option<u32>,

    /// Default final block share (overrides SUPPLY_SCHEDULE_FINAL_BLOCK_PCT)
    #[arg(long)]
    final_block_pct: Option<f64>,

    /// Default convexity exponent (overrides SUPPLY_SCHEDULE_ALPHA)
    #[arg(long)]
    alpha: Option<f64>,

    /// Default boundary rounding granularity (overrides SUPPLY_SCHEDULE_ROUND_TO_NEAREST)
    #[arg(long)]
    round_to_nearest: Option<u64>,
}

impl Args {
    /// Layer CLI overrides on top of the environment config
    fn into_config(self) -> ScheduleConfig {
        let mut config = ScheduleConfig::from_env();

        if let Some(n) = self.num_steps {
            config.num_steps = n;
        }
        if let Some(pct) = self.final_block_pct {
            config.final_block_pct = pct;
        }
        if let Some(alpha) = self.alpha {
            config.alpha = alpha;
        }
        if let Some(n) = self.round_to_nearest {
            config.round_to_nearest = Some(n);
        }

        config
    }
}

/// Request parameters for generate_supply_schedule tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct McpGenerateRequest {
    #[schemars(
        description = "Total number of blocks for the auction (e.g., 86400 for 2 days on Base with 2s blocks)"
    )]
    auction_blocks: u64,
    #[schemars(description = "Number of blocks for prebid period with 0 mps (default: 0)")]
    prebid_blocks: Option<u64>,
    #[schemars(description = "Number of steps for gradual release (default: 12)")]
    num_steps: Option<u32>,
    #[schemars(
        description = "Percentage of supply for final block as decimal, between 0 and 1 (default: 0.30)"
    )]
    final_block_pct: Option<f64>,
    #[schemars(description = "Convexity exponent for curve C(t) = t^alpha (default: 1.2)")]
    alpha: Option<f64>,
    #[schemars(
        description = "Round block boundaries to nearest N blocks (e.g., 100). Omit for no rounding."
    )]
    round_to_nearest: Option<u64>,
}

/// One schedule entry as accepted by encode_supply_schedule
#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct McpPhase {
    #[schemars(description = "Tokens per block in milli-basis points (max 16777215)")]
    mps: u64,
    #[serde(rename = "blockDelta")]
    #[schemars(description = "Number of blocks for this phase (max 1099511627775)")]
    block_delta: u64,
}

/// Request parameters for encode_supply_schedule tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct McpEncodeRequest {
    #[schemars(
        description = "Ordered list of {mps, blockDelta} objects, e.g. the schedule returned by generate_supply_schedule"
    )]
    schedule: Vec<McpPhase>,
}

/// Request parameters for decode_supply_schedule tool
#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct McpDecodeRequest {
    #[schemars(description = "0x-prefixed hex string as returned by encode_supply_schedule")]
    encoded: String,
}

/// The MCP server handler
#[derive(Clone)]
struct SupplyScheduleServer {
    generator: ScheduleGenerator,
    tool_router: ToolRouter<Self>,
}

impl SupplyScheduleServer {
    fn new(config: ScheduleConfig) -> Self {
        Self {
            generator: ScheduleGenerator::new(config),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router]
impl SupplyScheduleServer {
    #[tool(
        description = "Generate a CCA (Continuous Clearing Auction) supply schedule using a normalized convex curve. Supply is distributed equally across steps whose block durations DECREASE over time, with ~30% reserved for the final block. Returns an array of {mps, blockDelta} objects plus summary statistics. MPS = milli-basis points (1e7 = 10 million total)."
    )]
    async fn generate_supply_schedule(
        &self,
        Parameters(req): Parameters<McpGenerateRequest>,
    ) -> Result<String, String> {
        let tool_req = tools::GenerateScheduleRequest {
            auction_blocks: req.auction_blocks,
            prebid_blocks: req.prebid_blocks,
            num_steps: req.num_steps,
            final_block_pct: req.final_block_pct,
            alpha: req.alpha,
            round_to_nearest: req.round_to_nearest,
        };
        let response = tools::generate_supply_schedule(&self.generator, tool_req).map_err(|e| {
            tracing::error!("Error generating supply schedule: {}", e);
            e.to_structured_json()
        })?;
        serde_json::to_string_pretty(&response).map_err(|e| e.to_string())
    }

    #[tool(
        description = "Encode a supply schedule into packed bytes for onchain deployment. Each {mps, blockDelta} becomes one big-endian uint64: mps in the upper 24 bits, blockDelta in the lower 40 bits, concatenated like abi.encodePacked. Returns a 0x-prefixed hex string."
    )]
    async fn encode_supply_schedule(
        &self,
        Parameters(req): Parameters<McpEncodeRequest>,
    ) -> Result<String, String> {
        let tool_req = tools::EncodeScheduleRequest {
            schedule: req
                .schedule
                .into_iter()
                .map(|p| Phase::new(p.mps, p.block_delta))
                .collect(),
        };
        let response = tools::encode_supply_schedule(tool_req).map_err(|e| {
            tracing::error!("Error encoding supply schedule: {}", e);
            e.to_structured_json()
        })?;
        serde_json::to_string_pretty(&response).map_err(|e| e.to_string())
    }

    #[tool(
        description = "Decode a packed supply schedule (0x-prefixed hex from encode_supply_schedule) back into {mps, blockDelta} objects, exactly as the auction contract parses it."
    )]
    async fn decode_supply_schedule(
        &self,
        Parameters(req): Parameters<McpDecodeRequest>,
    ) -> Result<String, String> {
        let tool_req = tools::DecodeScheduleRequest {
            encoded: req.encoded,
        };
        let response =
            tools::decode_supply_schedule(tool_req).map_err(|e| e.to_structured_json())?;
        serde_json::to_string_pretty(&response).map_err(|e| e.to_string())
    }
}

#[tool_handler]
impl ServerHandler for SupplyScheduleServer {
    fn get_info(&self) -> ServerInfo {
        let config = self.generator.config();
        let instructions = format!(
            "MCP server for Continuous Clearing Auction supply schedules.\n\
             - generate_supply_schedule: {} equal-token steps on C(t) = t^{}, ~{}% final block, total {} MPS\n\
             - encode_supply_schedule: pack {{mps, blockDelta}} into uint64 words (24-bit mps | 40-bit blockDelta)\n\
             - decode_supply_schedule: unpack encoded hex for inspection\n\n\
             Errors are JSON objects with `code`, `message` and `recovery_action` fields.",
            config.num_steps,
            config.alpha,
            config.final_block_pct * 100.0,
            config.total_target
        );

        ServerInfo {
            instructions: Some(instructions),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Logs go to stderr; stdout carries the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("supply_schedule=info".parse()?)
                .add_directive("supply_schedule_mcp=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.into_config();
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid schedule defaults: {}", e))?;

    tracing::info!(
        "Starting CCA Supply Schedule MCP Server: num_steps={}, final_block_pct={}, alpha={}",
        config.num_steps,
        config.final_block_pct,
        config.alpha
    );

    let server = SupplyScheduleServer::new(config);

    let transport = (stdin(), stdout());
    let service = server.serve(transport).await?;

    service.waiting().await?;

    Ok(())
}
