use std::path::{Path, PathBuf};

use rule_engine::{CancellationToken, RuleEngine, RuleEngineConfig};
use rule_engine_example::{
    CustomerOrderPostModel, PLACE_ORDER_STEPS, PlaceOrderError, RuleType, keys, register_rules,
};
use tracing::debug;

use super::error::{CliError, Result};

pub(crate) struct PlaceOrderArgs {
    pub(crate) input: PathBuf,
    pub(crate) config: Option<PathBuf>,
    pub(crate) fail_at: Option<RuleType>,
}

pub(crate) fn run(args: &PlaceOrderArgs) -> Result<()> {
    let order = read_order(&args.input)?;
    let config = match &args.config {
        Some(path) => RuleEngineConfig::load(path)?,
        None => RuleEngineConfig::default(),
    };
    debug!(
        backward_jumps = %config.backward_jumps(),
        compensation_failure = %config.compensation_failure(),
        "engine configuration"
    );

    let mut request = order.to_request()?;
    if let Some(rule_type) = args.fail_at {
        request.insert(keys::FAIL_AT, rule_type.as_str());
    }

    let engine = RuleEngine::with_config(register_rules(), config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let cancel = CancellationToken::new();
    let (result, audit_log) =
        runtime.block_on(engine.execute_with_audit(&mut request, &cancel, &PLACE_ORDER_STEPS));

    let success = result.as_ref().is_ok_and(|response| response.is_success());
    println!("{success}");
    println!("{}", audit_log.summary());

    result.map_err(PlaceOrderError::from)?;
    Ok(())
}

fn read_order(path: &Path) -> Result<CustomerOrderPostModel> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadOrder {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| CliError::ParseOrder {
        path: path.to_path_buf(),
        source,
    })
}
