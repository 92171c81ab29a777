/// A canned question offered in the suggestions panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub icon: &'static str,
    pub text: &'static str,
    pub category: &'static str,
}

// Phrased narrowly so the backend answers from aggregated data instead of refusing.
pub const SUGGESTED_QUESTIONS: &[Suggestion] = &[
    Suggestion {
        icon: "\u{1F4CA}",
        text: "Which month had the highest total revenue in 2024?",
        category: "Monthly analysis",
    },
    Suggestion {
        icon: "\u{1F3C6}",
        text: "List the 5 products with the most units sold",
        category: "Top products",
    },
    Suggestion {
        icon: "\u{1F4B0}",
        text: "What was the total revenue for 2024?",
        category: "Revenue",
    },
    Suggestion {
        icon: "\u{1F30D}",
        text: "Which region generated the most sales revenue?",
        category: "Regional analysis",
    },
    Suggestion {
        icon: "\u{1F4C8}",
        text: "Show the revenue for each month of 2024",
        category: "Monthly evolution",
    },
    Suggestion {
        icon: "\u{1F3AF}",
        text: "Which category has the highest sales volume?",
        category: "Categories",
    },
    Suggestion {
        icon: "\u{1F4C5}",
        text: "Compare March and April 2024 revenue",
        category: "Comparison",
    },
    Suggestion {
        icon: "\u{1F6D2}",
        text: "How many different products were sold?",
        category: "Diversity",
    },
];

/// Look up a suggestion by its 1-based position as shown to the user.
pub fn by_number(n: usize) -> Option<&'static Suggestion> {
    n.checked_sub(1).and_then(|i| SUGGESTED_QUESTIONS.get(i))
}
