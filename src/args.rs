use clap::{Parser, Subcommand};

/// This is a command line front end for a voting ledger: it records elections, voters,
/// votable items and ranked ballots in a ledger file, and tallies results with a Borda count.
///
/// Every command is one transaction against the ledger file.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. See the manual of the
    /// ballot_ledger crate for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default govote-ledger.json) The ledger file. It is created on the first
    /// write. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub ledger: Option<String>,

    /// If passed as an argument, the JSON output is printed on a single line.
    #[clap(long, takes_value = false)]
    pub compact: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Writes the sample dataset: 3 voters, 3 votable items and 1 election.
    InitLedger,

    /// Creates (or replaces) a voter.
    NewVoter {
        #[clap(value_parser)]
        id: String,
        #[clap(value_parser)]
        name: String,
    },

    /// Creates (or replaces) an election.
    NewElection {
        #[clap(value_parser)]
        id: String,
        #[clap(value_parser)]
        name: String,
        /// (list of comma-separated values, or a JSON array) The registered voters.
        #[clap(long, value_parser)]
        voters: Vec<String>,
        /// (list of comma-separated values, or a JSON array) The votable items.
        #[clap(long, value_parser)]
        items: Vec<String>,
    },

    /// Creates (or replaces) a votable item.
    NewVotableItem {
        #[clap(value_parser)]
        id: String,
        #[clap(value_parser)]
        name: String,
        #[clap(value_parser)]
        description: String,
    },

    /// Casts the ballot of a voter. The items are ranked, most preferred first.
    CastVote {
        #[clap(value_parser)]
        voter_id: String,
        #[clap(value_parser)]
        election_id: String,
        /// (values, comma-separated values or a JSON array) The ranking. It may be
        /// empty, for an election without votable items.
        #[clap(value_parser)]
        items: Vec<String>,
    },

    /// Prints the Borda scores of an election.
    Results {
        #[clap(value_parser)]
        election_id: String,
        /// If passed as an argument, the items are also listed by decreasing score, ties
        /// resolved with the configured tie-break mode.
        #[clap(long, takes_value = false)]
        standings: bool,
        /// (file path) A reference file containing the expected results in JSON format. If provided,
        /// govote will check that the computed results match the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },

    GetBallot {
        #[clap(value_parser)]
        id: String,
    },

    GetVoter {
        #[clap(value_parser)]
        id: String,
    },

    GetElection {
        #[clap(value_parser)]
        id: String,
    },

    GetVotableItem {
        #[clap(value_parser)]
        id: String,
    },

    /// Prints true if any record is stored under this ID.
    AssetExists {
        #[clap(value_parser)]
        id: String,
    },

    /// Prints every record of the ledger, in key order.
    AllAssets,

    /// Deletes the record stored under this ID, whatever its kind.
    DeleteAsset {
        #[clap(value_parser)]
        id: String,
    },
}

impl Command {
    /// The name of the ledger operation this command runs.
    pub fn operation(&self) -> &'static str {
        match self {
            Command::InitLedger => "InitLedger",
            Command::NewVoter { .. } => "NewVoter",
            Command::NewElection { .. } => "NewElection",
            Command::NewVotableItem { .. } => "NewVotableItem",
            Command::CastVote { .. } => "CastVote",
            Command::Results { .. } => "GetResults",
            Command::GetBallot { .. } => "GetBallot",
            Command::GetVoter { .. } => "GetVoter",
            Command::GetElection { .. } => "GetElection",
            Command::GetVotableItem { .. } => "GetVotableItem",
            Command::AssetExists { .. } => "AssetExists",
            Command::AllAssets => "GetAllAssets",
            Command::DeleteAsset { .. } => "DeleteAsset",
        }
    }
}
