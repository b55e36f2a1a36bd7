use crate::core::error::{EngineError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// A directed debt: `debtor` owes `creditor` a positive integer `amount`.
///
/// This is the atomic unit of the obligation input. The netting engine never
/// works on obligations directly; they are aggregated into a
/// [`WeightedDirectedGraph`](crate::graph::weighted_graph::WeightedDirectedGraph) first.
///
/// # Examples
///
/// ```
/// use worm_netting::core::obligation::Obligation;
///
/// let obligation = Obligation::new("ALICE", "BOB", 250);
/// assert_eq!(obligation.amount(), 250);
/// assert_eq!(obligation.to_string(), "ALICE BOB 250");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    debtor: String,
    creditor: String,
    amount: u64,
}

impl Obligation {
    /// Create a new obligation.
    ///
    /// # Panics
    ///
    /// Panics if `amount` is zero.
    pub fn new(debtor: impl Into<String>, creditor: impl Into<String>, amount: u64) -> Self {
        assert!(amount > 0, "Obligation amount must be positive, got {}", amount);
        Self {
            debtor: debtor.into(),
            creditor: creditor.into(),
            amount,
        }
    }

    pub fn debtor(&self) -> &str {
        &self.debtor
    }

    pub fn creditor(&self) -> &str {
        &self.creditor
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// True when debtor and creditor are the same node.
    pub fn is_self_obligation(&self) -> bool {
        self.debtor == self.creditor
    }
}

impl fmt::Display for Obligation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.debtor, self.creditor, self.amount)
    }
}

/// The raw obligation list as read from a debt file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObligationSet {
    obligations: Vec<Obligation>,
}

impl ObligationSet {
    pub fn new() -> Self {
        Self {
            obligations: Vec::new(),
        }
    }

    /// Parse the line format `<from> <to> <amount>`.
    ///
    /// Tokens are separated by any whitespace. Blank lines and lines starting
    /// with `#` are skipped. The running total of all amounts must fit in a
    /// `u64`, so every sum the engine later forms over the set does too.
    pub fn parse(input: &str) -> Result<Self> {
        let mut set = Self::new();
        let mut total: u64 = 0;
        for (index, raw) in input.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let [from, to, amount] = tokens.as_slice() else {
                return Err(EngineError::Parse {
                    line: index + 1,
                    reason: format!("expected `<from> <to> <amount>`, got {} tokens", tokens.len()),
                });
            };
            let amount: u64 = amount.parse().map_err(|e| EngineError::Parse {
                line: index + 1,
                reason: format!("invalid amount '{}': {}", amount, e),
            })?;
            if amount == 0 {
                return Err(EngineError::Parse {
                    line: index + 1,
                    reason: "amount must be positive".to_string(),
                });
            }
            total = total.checked_add(amount).ok_or_else(|| EngineError::Parse {
                line: index + 1,
                reason: "total debt exceeds u64::MAX".to_string(),
            })?;
            set.add(Obligation::new(*from, *to, amount));
        }
        Ok(set)
    }

    /// Read and parse a debt file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Write the set back out in the line format accepted by [`parse`](Self::parse).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_lines())?;
        Ok(())
    }

    pub fn to_lines(&self) -> String {
        self.obligations
            .iter()
            .map(|o| format!("{}\n", o))
            .collect()
    }

    pub fn add(&mut self, obligation: Obligation) {
        self.obligations.push(obligation);
    }

    pub fn obligations(&self) -> &[Obligation] {
        &self.obligations
    }

    pub fn len(&self) -> usize {
        self.obligations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obligations.is_empty()
    }

    /// Total gross value of all obligations.
    pub fn gross_total(&self) -> u128 {
        self.obligations.iter().map(|o| o.amount() as u128).sum()
    }

    /// Sum duplicate (debtor, creditor) pairs into one obligation each.
    ///
    /// Pairs keep the order in which they were first seen. Self obligations
    /// are dropped since they net to nothing.
    ///
    /// Fails with [`EngineError::AmountOverflow`] when the aggregated total
    /// does not fit in a `u64`.
    pub fn aggregate(&self) -> Result<Vec<Obligation>> {
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();
        let mut aggregated: Vec<Obligation> = Vec::new();
        let mut total: u64 = 0;
        for ob in &self.obligations {
            if ob.is_self_obligation() {
                warn!("dropping self obligation {}", ob);
                continue;
            }
            total = total
                .checked_add(ob.amount())
                .ok_or_else(|| amount_overflow(ob.debtor(), ob.creditor()))?;
            match index.get(&(ob.debtor(), ob.creditor())) {
                // bounded by `total`, cannot overflow
                Some(&i) => aggregated[i].amount += ob.amount(),
                None => {
                    index.insert((ob.debtor(), ob.creditor()), aggregated.len());
                    aggregated.push(ob.clone());
                }
            }
        }
        Ok(aggregated)
    }
}

pub(crate) fn amount_overflow(debtor: &str, creditor: &str) -> EngineError {
    EngineError::AmountOverflow {
        debtor: debtor.to_string(),
        creditor: creditor.to_string(),
    }
}

impl FromIterator<Obligation> for ObligationSet {
    fn from_iter<T: IntoIterator<Item = Obligation>>(iter: T) -> Self {
        Self {
            obligations: iter.into_iter().collect(),
        }
    }
}
