use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CriteriaError;

/// Date window applied to the transaction list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateFilter {
    #[default]
    Today,
    Week,
    October,
}

impl DateFilter {
    pub const ALL: [DateFilter; 3] = [Self::Today, Self::Week, Self::October];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Week => "week",
            Self::October => "october",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Hoy",
            Self::Week => "Esta semana",
            Self::October => "Octubre",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Today => "Transacciones del día actual",
            Self::Week => "Últimos 7 días",
            Self::October => "Todo el mes de octubre",
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateFilter {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| CriteriaError::UnknownDateFilter(s.to_string()))
    }
}

/// Sales-channel restriction. `All` lifts the restriction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    All,
    Terminal,
    PaymentLink,
}

impl TypeFilter {
    pub const ALL: [TypeFilter; 3] = [Self::All, Self::Terminal, Self::PaymentLink];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Terminal => "terminal",
            Self::PaymentLink => "payment_link",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "Ver todos",
            Self::Terminal => "Cobro con datáfono",
            Self::PaymentLink => "Cobro con link de pago",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::All => "Mostrar todas las transacciones",
            Self::Terminal => "Transacciones con terminal",
            Self::PaymentLink => "Transacciones con link de pago",
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeFilter {
    type Err = CriteriaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|filter| filter.as_str() == s)
            .ok_or_else(|| CriteriaError::UnknownTypeFilter(s.to_string()))
    }
}

/// The user's current filter selection.
///
/// Serialized with the same field names the dashboard has always persisted:
///
/// ```json
/// {"dateFilter":"today","transactionTypeFilter":["all"],"searchTerm":""}
/// ```
///
/// Decoding is lenient per field: an unknown date keeps the default date,
/// unknown types are dropped and the other fields survive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredCriteria")]
pub struct FilterCriteria {
    pub date_filter: DateFilter,
    #[serde(rename = "transactionTypeFilter")]
    pub type_filter: Vec<TypeFilter>,
    pub search_term: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            date_filter: DateFilter::Today,
            type_filter: vec![TypeFilter::All],
            search_term: String::new(),
        }
    }
}

impl FilterCriteria {
    /// Trimmed search term, `None` when there is nothing to search for.
    pub fn active_search(&self) -> Option<&str> {
        let term = self.search_term.trim();
        (!term.is_empty()).then_some(term)
    }
}

/// Raw shape of the persisted criteria, before the values are checked.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StoredCriteria {
    date_filter: Option<String>,
    #[serde(rename = "transactionTypeFilter")]
    type_filter: Option<Vec<String>>,
    search_term: String,
}

impl From<StoredCriteria> for FilterCriteria {
    fn from(stored: StoredCriteria) -> Self {
        let defaults = FilterCriteria::default();

        let date_filter = match stored.date_filter {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!("keeping default date filter: {err}");
                defaults.date_filter
            }),
            None => defaults.date_filter,
        };

        let type_filter = match stored.type_filter {
            Some(raw) => {
                let known: Vec<TypeFilter> = raw
                    .iter()
                    .filter_map(|value| match value.parse() {
                        Ok(filter) => Some(filter),
                        Err(err) => {
                            tracing::warn!("dropping saved type filter: {err}");
                            None
                        }
                    })
                    .collect();
                if known.is_empty() && !raw.is_empty() {
                    defaults.type_filter
                } else {
                    known
                }
            }
            None => defaults.type_filter,
        };

        Self {
            date_filter,
            type_filter,
            search_term: stored.search_term,
        }
    }
}

pub fn is_unrestricted(types: &[TypeFilter]) -> bool {
    types.is_empty() || types.contains(&TypeFilter::All)
}

/// Applies one checkbox change of the type picker to `selection`.
///
/// - checking `All` selects only `All`, unchecking it clears the selection;
/// - checking a concrete type drops `All`;
/// - unchecking the last concrete type falls back to `All`.
pub fn toggle_type(selection: &[TypeFilter], filter: TypeFilter, checked: bool) -> Vec<TypeFilter> {
    if filter == TypeFilter::All {
        return if checked { vec![TypeFilter::All] } else { Vec::new() };
    }

    let mut next: Vec<TypeFilter> = selection
        .iter()
        .copied()
        .filter(|f| *f != TypeFilter::All && *f != filter)
        .collect();
    if checked {
        next.push(filter);
    } else if next.is_empty() {
        next.push(TypeFilter::All);
    }
    next
}
