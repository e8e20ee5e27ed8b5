// ********* Ledger records ***********

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A kind of record stored in the world state under its own ID.
pub trait Record: Serialize + DeserializeOwned {
    /// Human readable name of the kind, used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

// Older producers write `null` for an empty map or list.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The key of the ballot a voter casts in an election.
pub fn ballot_id(voter_id: &str, election_id: &str) -> String {
    format!("{}-{}", voter_id, election_id)
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Voter {
    #[serde(rename = "ID")]
    pub id: String,
    /// The ballots cast by this voter, as ElectionID -> BallotID.
    #[serde(rename = "Ballots", default, deserialize_with = "null_as_default")]
    pub ballots: BTreeMap<String, String>,
    #[serde(rename = "Name")]
    pub name: String,
}

impl Voter {
    pub fn new(id: &str, name: &str) -> Voter {
        Voter {
            id: id.to_string(),
            ballots: BTreeMap::new(),
            name: name.to_string(),
        }
    }

    pub fn has_voted_in(&self, election_id: &str) -> bool {
        self.ballots.contains_key(election_id)
    }
}

impl Record for Voter {
    const KIND: &'static str = "voter";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Election {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    /// The voters authorized to vote in this election.
    #[serde(
        rename = "RegisteredVoters",
        default,
        deserialize_with = "null_as_default"
    )]
    pub registered_voters: Vec<String>,
    /// The candidate set. The order carries no preference.
    #[serde(rename = "VotableItems", default, deserialize_with = "null_as_default")]
    pub votable_items: Vec<String>,
}

impl Election {
    pub fn new(id: &str, name: &str, voters: &[String], items: &[String]) -> Election {
        Election {
            id: id.to_string(),
            name: name.to_string(),
            registered_voters: voters.to_vec(),
            votable_items: items.to_vec(),
        }
    }

    pub fn is_registered(&self, voter_id: &str) -> bool {
        self.registered_voters.iter().any(|v| v == voter_id)
    }
}

impl Record for Election {
    const KIND: &'static str = "election";

    fn id(&self) -> &str {
        &self.id
    }
}

/// A candidate or choice of an election.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct VotableItem {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: String,
}

impl VotableItem {
    pub fn new(id: &str, name: &str, description: &str) -> VotableItem {
        VotableItem {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

impl Record for VotableItem {
    const KIND: &'static str = "votable item";

    fn id(&self) -> &str {
        &self.id
    }
}

/// One voter's ranking for one election, most preferred item first.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Ballot {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "VoterID")]
    pub voter_id: String,
    #[serde(rename = "ElectionID")]
    pub election_id: String,
    #[serde(rename = "VotableItems", default, deserialize_with = "null_as_default")]
    pub votable_items: Vec<String>,
}

impl Ballot {
    /// Builds the ballot with its deterministic ID.
    pub fn new(voter_id: &str, election_id: &str, ranked_items: &[String]) -> Ballot {
        Ballot {
            id: ballot_id(voter_id, election_id),
            voter_id: voter_id.to_string(),
            election_id: election_id.to_string(),
            votable_items: ranked_items.to_vec(),
        }
    }
}

impl Record for Ballot {
    const KIND: &'static str = "ballot";

    fn id(&self) -> &str {
        &self.id
    }
}
