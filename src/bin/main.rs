//! CRYB wallet CLI - JSON in, JSON out
//!
//!   cryb-wallet providers [--inject ethereum.isMetaMask]   → detection table
//!   cryb-wallet install <provider>                         → install info
//!   cryb-wallet classify <message> [--code N]              → classified error
//!   cryb-wallet gas [--type T] [--preset P] [--data HEX]   → fee estimate (mock network)
//!   cryb-wallet connect <provider> [--reject MSG]          → state machine walk (mock wallet)
//!
//! Output format:
//!   --json     Compact JSON (default for non-tty)
//!   --pretty   Pretty-print JSON (default for tty)

use anyhow::{anyhow, bail, Context};
use cryb_wallet::connection::{parse_chain_id, ManagerConfig, MockWallet, ProviderError};
use cryb_wallet::core::consts::env as env_vars;
use cryb_wallet::gas::{GasPreset, MockNetworkOracle, NetworkStatus, TransactionDescriptor, TransactionType};
use cryb_wallet::logging::init_logging;
use cryb_wallet::{
    classify, ClassifiedError, ConnectError, ConnectionManager, GasEstimate, GasEstimator, ProviderId, ProviderRegistry,
    RawError, StaticProbe, WalletHooks,
};
use serde_json::{json, Value};
use std::env;
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};
use tracing::debug;

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let opts = ParsedArgs::parse(&args[1..]);

    if opts.help {
        print_usage();
        return;
    }

    if opts.version {
        println!("cryb-wallet {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let result = match opts.command.as_deref() {
        Some("providers") => cmd_providers(&opts),
        Some("install") => cmd_install(&opts),
        Some("classify") => cmd_classify(&opts),
        Some("gas") => cmd_gas(&opts),
        Some("connect") => cmd_connect(&opts),
        Some(cmd) => Err(anyhow!("Unknown command: {}", cmd)),
        None => {
            print_usage();
            return;
        }
    };

    let pretty = opts.pretty || (!opts.json && std::io::stdout().is_terminal());
    match result {
        Ok(output) => println!("{}", render(&output, pretty)),
        Err(e) => {
            eprintln!("{}", render(&json!({"error": format!("{:#}", e)}), pretty));
            std::process::exit(1);
        }
    }
}

fn render(value: &Value, pretty: bool) -> String {
    let rendered = if pretty { serde_json::to_string_pretty(value) } else { serde_json::to_string(value) };
    rendered.unwrap_or_else(|_| value.to_string())
}

#[derive(Default)]
struct ParsedArgs {
    command: Option<String>,
    positional: Vec<String>,
    inject: Vec<String>,
    code: Option<i64>,
    // gas options
    tx_type: Option<String>,
    preset: Option<String>,
    data: Option<String>,
    to: Option<String>,
    value: Option<u128>,
    contract: bool,
    gas_price: Option<f64>,
    gas_limit: Option<u64>,
    // connect options
    reject: Option<String>,
    chain: Option<String>,
    disconnect: bool,
    // output options
    json: bool,
    pretty: bool,
    help: bool,
    version: bool,
}

impl ParsedArgs {
    fn parse(args: &[String]) -> Self {
        let mut opts = ParsedArgs::default();
        let mut positional = Vec::new();
        let mut i = 0;

        while i < args.len() {
            let arg = &args[i];
            let next = args.get(i + 1).cloned();
            let mut consumed = true;
            match arg.as_str() {
                "--help" | "-h" => { opts.help = true; consumed = false; }
                "--version" | "-V" => { opts.version = true; consumed = false; }
                "--json" => { opts.json = true; consumed = false; }
                "--pretty" => { opts.pretty = true; consumed = false; }
                "--contract" => { opts.contract = true; consumed = false; }
                "--disconnect" => { opts.disconnect = true; consumed = false; }
                "--inject" | "-i" => opts.inject.extend(next),
                "--code" | "-c" => opts.code = next.and_then(|s| s.parse().ok()),
                "--type" | "-t" => opts.tx_type = next,
                "--preset" | "-p" => opts.preset = next,
                "--data" => opts.data = next,
                "--to" => opts.to = next,
                "--value" => opts.value = next.and_then(|s| s.parse().ok()),
                "--gas-price" => opts.gas_price = next.and_then(|s| s.parse().ok()),
                "--gas-limit" => opts.gas_limit = next.and_then(|s| s.parse().ok()),
                "--reject" => opts.reject = next,
                "--chain" => opts.chain = next,
                _ if !arg.starts_with('-') || arg.parse::<f64>().is_ok() => {
                    positional.push(arg.clone());
                    consumed = false;
                }
                _ => consumed = false, // Ignore unknown flags
            }
            i += if consumed { 2 } else { 1 };
        }

        if !positional.is_empty() {
            opts.command = Some(positional.remove(0));
        }
        opts.positional = positional;

        // Injected globals from the environment (lower priority than CLI args)
        if opts.inject.is_empty() {
            if let Ok(specs) = env::var(env_vars::INJECT) {
                opts.inject = specs.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
            }
        }

        opts
    }

    fn registry(&self) -> ProviderRegistry {
        let probe = StaticProbe::from_specs(self.inject.iter().map(String::as_str));
        ProviderRegistry::new(Arc::new(probe))
    }

    fn provider(&self) -> anyhow::Result<ProviderId> {
        let name = self.positional.first().context("missing <provider> argument")?;
        ProviderId::from_str(name).with_context(|| format!("unknown provider: {}", name))
    }
}

fn print_usage() {
    println!(
        r#"cryb-wallet - wallet connection and gas estimation core

USAGE:
    cryb-wallet <command> [args] [options]

COMMANDS:
    providers                 Detect installed wallet providers
    install <provider>        Install info for a provider
    classify <message>        Classify a raw wallet/RPC error
    gas                       Estimate fees against the mock network
    connect <provider>        Walk the connection state machine against the mock wallet

DETECTION OPTIONS:
    --inject, -i <g.flag>     Pretend a global (and flag) is injected, e.g. ethereum.isMetaMask
                              (can repeat, env: CRYB_INJECT=a.b,c)

CLASSIFY OPTIONS:
    --code, -c <n>            Provider error code (4902, -32002, ...)

GAS OPTIONS:
    --type, -t <type>         transfer|contract|swap|nft|stake|other
    --preset, -p <preset>     slow|standard|fast|custom
    --data <hex>              Calldata (0x-prefixed)
    --to <address>            Recipient
    --value <wei>             Value in wei
    --contract                Mark as contract interaction
    --gas-price <gwei>        Custom gas price (implies custom)
    --gas-limit <n>           Custom gas limit (implies custom)

CONNECT OPTIONS:
    --reject <message>        Make the mock wallet reject with this message (with --code)
    --chain <id>              Chain the mock wallet reports (hex or decimal)
    --disconnect              Disconnect after connecting

OUTPUT OPTIONS:
    --json                    Compact JSON output
    --pretty                  Pretty-print JSON
    --version, -V             Print version

ENVIRONMENT:
    {web3}, {prompts}, {timeout}, {ttl}, {log}

EXAMPLES:
    cryb-wallet providers --inject ethereum.isMetaMask
    cryb-wallet classify "User rejected the transaction"
    cryb-wallet gas --type swap --preset fast
    cryb-wallet connect metamask --inject ethereum.isMetaMask --chain 0x89
"#,
        web3 = env_vars::WEB3_ENABLED,
        prompts = env_vars::INSTALL_PROMPTS,
        timeout = env_vars::CONNECT_TIMEOUT_MS,
        ttl = env_vars::SESSION_TTL_SECS,
        log = env_vars::LOG_JSON,
    );
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to create runtime")
}

fn cmd_providers(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let registry = opts.registry();
    let providers = registry.detect_providers();
    let recommended = registry.recommended();
    debug!(count = providers.len(), "detected providers");
    Ok(json!({ "providers": providers, "recommended": recommended.id }))
}

fn cmd_install(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let provider = opts.provider()?;
    let registry = opts.registry();
    Ok(json!({
        "installed": registry.is_installed(provider),
        "install": registry.resolve_install_info(provider),
    }))
}

fn cmd_classify(opts: &ParsedArgs) -> anyhow::Result<Value> {
    if opts.positional.is_empty() {
        bail!("missing <message> argument");
    }
    let mut raw = RawError::new(opts.positional.join(" "));
    if let Some(code) = opts.code {
        raw = raw.with_code(code);
    }
    let error = classify(&raw);
    Ok(json!({
        "error": error,
        "transient": error.is_transient(),
        "technical": error.technical_details(),
    }))
}

fn cmd_gas(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let tx_type = opts.tx_type.as_deref().map(TransactionType::from_str).unwrap_or_default();
    let mut descriptor = TransactionDescriptor::new(tx_type);
    if let Some(to) = &opts.to { descriptor = descriptor.with_to(to.clone()); }
    if let Some(value) = opts.value { descriptor = descriptor.with_value(value); }
    if let Some(data) = &opts.data { descriptor = descriptor.with_data(data.clone()); }
    if opts.contract { descriptor = descriptor.with_contract_interaction(); }

    let preset = match opts.preset.as_deref() {
        Some(p) => GasPreset::from_str(p).with_context(|| format!("unknown preset: {}", p))?,
        None if opts.gas_price.is_some() || opts.gas_limit.is_some() => GasPreset::Custom,
        None => GasPreset::Standard,
    };

    let estimator = GasEstimator::new(Arc::new(MockNetworkOracle::new(NetworkStatus::default())));
    let base = runtime()?.block_on(estimator.estimate_gas(descriptor)).map_err(describe)?;

    let estimate = match preset {
        GasPreset::Standard => Some(base.clone()),
        GasPreset::Custom => estimator.set_custom_gas(
            opts.gas_price.unwrap_or(base.gas_price_gwei),
            opts.gas_limit.unwrap_or(base.gas_limit),
        ),
        other => estimator.set_preset(other),
    };
    let estimate = estimate.context("no estimate available")?;
    Ok(json!({ "estimate": estimate, "status": estimator.status() }))
}

fn describe(error: ClassifiedError) -> anyhow::Error {
    match error.technical_details() {
        Some(detail) => anyhow!("{}: {}", error.title, detail.message),
        None => anyhow!("{}", error),
    }
}

/// Hook calls recorded in order, echoed in the `connect` output.
#[derive(Default)]
struct TraceHooks {
    events: Mutex<Vec<Value>>,
}

impl TraceHooks {
    fn record(&self, event: Value) {
        if let Ok(mut events) = self.events.lock() { events.push(event); }
    }

    fn take(&self) -> Vec<Value> {
        self.events.lock().map(|mut e| std::mem::take(&mut *e)).unwrap_or_default()
    }
}

impl WalletHooks for TraceHooks {
    fn on_connect(&self, provider: ProviderId, account: &str) {
        self.record(json!({"hook": "on_connect", "provider": provider, "account": account}));
    }
    fn on_disconnect(&self) {
        self.record(json!({"hook": "on_disconnect"}));
    }
    fn on_error(&self, error: &ClassifiedError, context: &str) {
        self.record(json!({"hook": "on_error", "kind": error.kind, "context": context}));
    }
    fn on_gas_estimate_change(&self, estimate: &GasEstimate) {
        self.record(json!({"hook": "on_gas_estimate_change", "fee": estimate.fee}));
    }
}

fn cmd_connect(opts: &ParsedArgs) -> anyhow::Result<Value> {
    let provider = opts.provider()?;
    let mut wallet = MockWallet::new();
    if let Some(chain) = &opts.chain {
        wallet = wallet.with_chain(parse_chain_id(chain).with_context(|| format!("invalid chain id: {}", chain))?);
    }
    if let Some(message) = &opts.reject {
        let mut error = ProviderError::new(message.clone());
        if let Some(code) = opts.code { error = error.with_code(code); }
        wallet.set_reject(Some(error));
    }

    let hooks = Arc::new(TraceHooks::default());
    let manager = ConnectionManager::new(ManagerConfig::from_env(), opts.registry(), Arc::new(wallet))
        .with_hooks(hooks.clone());

    runtime()?.block_on(async {
        let mut steps = Vec::new();
        let remembered = manager.init().await;
        steps.push(json!({"step": "init", "remembered": remembered, "state": manager.state()}));

        let step = match manager.connect(provider).await {
            Ok(outcome) => json!({"step": "connect", "outcome": outcome, "state": manager.state()}),
            Err(ConnectError::Failed(error)) => json!({"step": "connect", "error": error, "state": manager.state()}),
            Err(e) => return Err(anyhow::Error::new(e).context("connect")),
        };
        steps.push(step);

        if opts.disconnect {
            let result = manager.disconnect().await;
            steps.push(json!({
                "step": "disconnect",
                "error": result.err().and_then(|e| e.classified().cloned()),
                "state": manager.state(),
            }));
        }

        let errors = manager.errors();
        manager.teardown().await;
        Ok(json!({ "steps": steps, "hooks": hooks.take(), "errors": errors }))
    })
}
