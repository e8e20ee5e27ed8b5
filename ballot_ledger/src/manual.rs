/*!

This is the long-form manual for `ballot_ledger` and `govote`.

## Records

All records live in one flat keyspace: the ID of a record is its key, for
every kind. Nothing prevents a voter and an election from sharing an ID, so
pick IDs that do not collide. Records are stored as JSON objects:

| kind         | fields                                                   |
|--------------|----------------------------------------------------------|
| voter        | `ID`, `Ballots` (ElectionID -> BallotID), `Name`         |
| election     | `ID`, `Name`, `RegisteredVoters`, `VotableItems`         |
| votable item | `ID`, `Name`, `Description`                              |
| ballot       | `ID`, `VoterID`, `ElectionID`, `VotableItems` (ranked)   |

A ballot is always stored under `<VoterID>-<ElectionID>`.

## Casting a vote

A ballot is accepted when, in this order:
1. the voter exists,
2. the voter has no ballot for this election yet (`AlreadyVoted`),
3. the election exists,
4. the voter is in `RegisteredVoters` (`NotRegistered`),
5. the ranking has exactly as many entries as the election has items, and
   contains every one of them (`InvalidSelection`).

The ballot is then stored and linked in the voter's `Ballots`, in the same
transaction.

## Results

Results are a Borda count. With `n` items in the election, the item ranked
first on a ballot earns `n` points, the second `n - 1`, down to `1` for the
last one. Registered voters who did not vote add nothing. The scores are
returned as they are, ties included. `govote results --standings` orders them
with a tie-break mode:

- `useCandidateOrder` (default): equal scores keep the order in which the
  election lists its items.
- `random`: equal scores are ordered by the SHA-256 digest of the seed
  (`randomSeed`) and the item ID.

## Command line

```bash
govote init-ledger
govote cast-vote voter1 election1 item2 item1
govote results election1 --standings
```

Lists of IDs (`--voters`, `--items`, and the ranking of `cast-vote`) are given
either as separate or comma-separated values, or as one JSON array:
`'["item2","item1"]'`.

## Configuration

`govote --config govote.json` reads:

```json
{
  "ledgerSettings": { "ledgerPath": "ledger.json" },
  "outputSettings": { "pretty": true },
  "rules": { "tiebreakMode": "random", "randomSeed": "42" }
}
```

All sections are optional. A relative `ledgerPath` is resolved against the
directory of the configuration file. `--ledger` and `--compact` override the
file.

 */
