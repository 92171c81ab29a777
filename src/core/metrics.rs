use serde::{Deserialize, Serialize};

pub const LOADING_PLACEHOLDER: &str = "Loading...";

/// Dashboard figures as served by the metrics endpoint. Field names on the
/// wire follow the backend's contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(rename = "melhor_mes")]
    pub best_month: BestMonth,
    #[serde(rename = "produto_mais_vendido")]
    pub top_product: TopProduct,
    #[serde(rename = "quantidade_produtos")]
    pub distinct_product_count: u64,
    /// Preformatted currency string, e.g. `R$ 1.234,56`.
    #[serde(rename = "vendas_totais_ano")]
    pub total_revenue: String,
    pub files_processed: u64,
    pub records_analyzed: u64,
    pub last_updated: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestMonth {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "valor")]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: u64,
}

impl MetricsSnapshot {
    /// Time part of `last_updated` (`dd/mm/yyyy HH:MM`), or the whole value if it has no space.
    pub fn updated_time(&self) -> &str {
        self.last_updated
            .split_once(' ')
            .map(|(_, time)| time)
            .unwrap_or(&self.last_updated)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricCard {
    pub title: &'static str,
    pub value: String,
    pub caption: String,
}

/// The four dashboard cards. Without a snapshot every value shows the
/// loading placeholder while a request is outstanding, zeroed defaults otherwise.
pub fn metric_cards(snapshot: Option<&MetricsSnapshot>, loading: bool) -> [MetricCard; 4] {
    match snapshot {
        Some(m) => [
            MetricCard {
                title: "Top Product",
                value: m.top_product.name.clone(),
                caption: format!("{} units", m.top_product.quantity),
            },
            MetricCard {
                title: "Product Count",
                value: m.distinct_product_count.to_string(),
                caption: "unique products".into(),
            },
            MetricCard {
                title: "Yearly Sales",
                value: m.total_revenue.clone(),
                caption: format!("{} spreadsheets", m.files_processed),
            },
            MetricCard {
                title: "Best Month",
                value: m.best_month.name.clone(),
                caption: m.best_month.value.clone(),
            },
        ],
        None => {
            let or_loading = |fallback: &str| {
                if loading {
                    LOADING_PLACEHOLDER.to_string()
                } else {
                    fallback.to_string()
                }
            };
            [
                MetricCard {
                    title: "Top Product",
                    value: or_loading("N/A"),
                    caption: "0 units".into(),
                },
                MetricCard {
                    title: "Product Count",
                    value: or_loading("0"),
                    caption: "unique products".into(),
                },
                MetricCard {
                    title: "Yearly Sales",
                    value: or_loading("R$ 0,00"),
                    caption: "0 spreadsheets".into(),
                },
                MetricCard {
                    title: "Best Month",
                    value: or_loading("N/A"),
                    caption: "R$ 0,00".into(),
                },
            ]
        }
    }
}
