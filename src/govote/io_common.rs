use crate::govote::*;

/// Flattens lists of IDs given on the command line.
///
/// Each input is either a JSON array of strings (`["a","b"]`) or comma-separated
/// values. Blank entries are dropped.
pub fn parse_id_list(inputs: &[String]) -> GoVoteResult<Vec<String>> {
    let mut ids: Vec<String> = Vec::new();
    for input in inputs.iter() {
        let trimmed = input.trim();
        if trimmed.starts_with('[') {
            let parsed: Vec<String> =
                serde_json::from_str(trimmed).context(ParsingIdListSnafu { input: trimmed })?;
            ids.extend(parsed);
        } else {
            ids.extend(
                trimmed
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string()),
            );
        }
    }
    debug!("parse_id_list: {:?} -> {:?}", inputs, ids);
    Ok(ids)
}

pub fn results_to_json(results: &ElectionResults, standings: Option<&[Standing]>) -> JSValue {
    let mut js = json!({
        "electionId": results.election_id,
        "scores": results.scores,
        "ballotsCounted": results.ballots_counted,
        "text": results.to_string(),
    });
    if let Some(st) = standings {
        let lines: Vec<JSValue> = st
            .iter()
            .map(|s| {
                json!({
                    "place": s.place,
                    "item": s.item_id,
                    "score": s.score,
                    "tied": s.tied,
                })
            })
            .collect();
        js["standings"] = JSValue::Array(lines);
    }
    js
}

/// Stored records are printed as JSON when they parse, as strings otherwise.
pub fn assets_to_json(records: &[String]) -> JSValue {
    JSValue::Array(
        records
            .iter()
            .map(|r| serde_json::from_str::<JSValue>(r).unwrap_or_else(|_| json!(r)))
            .collect(),
    )
}

pub fn render_json(value: &JSValue, pretty: bool) -> GoVoteResult<String> {
    let s = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    s.context(SerializingJsonSnafu)
}

pub fn read_reference(path: &str) -> GoVoteResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_reference: {:?}", js);
    Ok(js)
}

/// Fails when `computed` differs from the reference document, after printing a
/// line diff of the two.
pub fn check_reference(computed: &JSValue, reference_path: &str) -> GoVoteResult<()> {
    let reference = read_reference(reference_path)?;
    let pretty_reference = render_json(&reference, true)?;
    let pretty_computed = render_json(computed, true)?;
    if pretty_reference != pretty_computed {
        warn!("Found differences with the reference {}", reference_path);
        print_diff(pretty_reference.as_str(), pretty_computed.as_str(), "\n");
        whatever!("Difference detected between computed results and reference results")
    }
    info!("Results match the reference {}", reference_path);
    Ok(())
}
