use crate::govote::*;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerSettings {
    #[serde(rename = "ledgerPath")]
    pub ledger_path: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "pretty")]
    pub pretty: Option<bool>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct TallyRules {
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: String,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoVoteConfig {
    #[serde(rename = "ledgerSettings", default)]
    pub ledger_settings: LedgerSettings,
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    pub rules: Option<TallyRules>,
}

/// The settings of one run, once the configuration file and the command line
/// flags have been merged.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub ledger_path: PathBuf,
    pub pretty: bool,
    pub tiebreak_mode: TieBreakMode,
}

pub const DEFAULT_LEDGER_PATH: &str = "govote-ledger.json";

pub fn read_config(path: &str) -> GoVoteResult<GoVoteConfig> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: GoVoteConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

pub fn validate_rules(rules: &TallyRules) -> GoVoteResult<TieBreakMode> {
    let res = match rules.tiebreak_mode.as_str() {
        "useCandidateOrder" => TieBreakMode::UseCandidateOrder,
        "random" => {
            let seed = match rules.random_seed.clone().map(|s| s.parse::<u32>()) {
                Some(Ok(x)) => x,
                x => {
                    whatever!(
                        "Cannot use tiebreak mode random without a valid randomSeed: {:?}",
                        x
                    )
                }
            };
            TieBreakMode::Random(seed)
        }
        x => {
            whatever!("Cannot use tiebreak mode {:?}: not supported", x)
        }
    };
    Ok(res)
}

/// Merges the configuration file (if any) with the command line flags. Flags win.
pub fn resolve_settings(args: &Args) -> GoVoteResult<Settings> {
    let (config, config_dir) = match &args.config {
        Some(p) => {
            let config = read_config(p)?;
            let dir = Path::new(p).parent().map(|d| d.to_path_buf());
            (config, dir)
        }
        None => (GoVoteConfig::default(), None),
    };

    let ledger_path: PathBuf = match (&args.ledger, &config.ledger_settings.ledger_path) {
        (Some(p), _) => PathBuf::from(p),
        (None, Some(p)) => match &config_dir {
            Some(dir) if Path::new(p).is_relative() => dir.join(p),
            _ => PathBuf::from(p),
        },
        (None, None) => PathBuf::from(DEFAULT_LEDGER_PATH),
    };

    let tiebreak_mode = match &config.rules {
        Some(rules) => validate_rules(rules)?,
        None => TieBreakMode::UseCandidateOrder,
    };

    let settings = Settings {
        ledger_path,
        pretty: !args.compact && config.output_settings.pretty.unwrap_or(true),
        tiebreak_mode,
    };
    info!("settings: {:?}", settings);
    Ok(settings)
}
