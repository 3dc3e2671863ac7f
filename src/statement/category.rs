use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The eight income-statement sections a line item can be assigned to.
///
/// Declaration order follows statement structure: revenue, expenses,
/// pretax income, tax, after-tax income. Ties during classification are
/// broken by this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "or")]
    OperatingRevenue,
    #[serde(rename = "cogs")]
    CostOfGoodsSold,
    #[serde(rename = "oe")]
    OperatingExpense,
    #[serde(rename = "oibt")]
    OperatingIncomeBeforeTax,
    #[serde(rename = "fibt")]
    FinancingIncomeBeforeTax,
    #[serde(rename = "tax")]
    Tax,
    #[serde(rename = "ooiat")]
    OtherOperatingIncomeAfterTax,
    #[serde(rename = "fiat")]
    FinancingIncomeAfterTax,
}

impl Category {
    pub const COUNT: usize = 8;

    /// Every category, in enumeration order.
    pub const ALL: [Category; Category::COUNT] = [
        Category::OperatingRevenue,
        Category::CostOfGoodsSold,
        Category::OperatingExpense,
        Category::OperatingIncomeBeforeTax,
        Category::FinancingIncomeBeforeTax,
        Category::Tax,
        Category::OtherOperatingIncomeAfterTax,
        Category::FinancingIncomeAfterTax,
    ];

    /// Position of this category in [`Category::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Short code used in input files and on the command line.
    pub const fn code(self) -> &'static str {
        match self {
            Category::OperatingRevenue => "or",
            Category::CostOfGoodsSold => "cogs",
            Category::OperatingExpense => "oe",
            Category::OperatingIncomeBeforeTax => "oibt",
            Category::FinancingIncomeBeforeTax => "fibt",
            Category::Tax => "tax",
            Category::OtherOperatingIncomeAfterTax => "ooiat",
            Category::FinancingIncomeAfterTax => "fiat",
        }
    }

    /// Human-readable section name.
    pub const fn label(self) -> &'static str {
        match self {
            Category::OperatingRevenue => "Operating revenue",
            Category::CostOfGoodsSold => "Cost of goods sold",
            Category::OperatingExpense => "Operating expense",
            Category::OperatingIncomeBeforeTax => "Operating income before tax",
            Category::FinancingIncomeBeforeTax => "Financing income before tax",
            Category::Tax => "Tax",
            Category::OtherOperatingIncomeAfterTax => "Other operating income after tax",
            Category::FinancingIncomeAfterTax => "Financing income after tax",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.code() == needle)
            .ok_or_else(|| format!("unknown category code: {s}"))
    }
}

/// What precedes a row during classification.
///
/// `Start` stands for "no predecessor": the first row of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Predecessor {
    Start,
    After(Category),
}

impl From<Category> for Predecessor {
    fn from(category: Category) -> Self {
        Predecessor::After(category)
    }
}

impl fmt::Display for Predecessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predecessor::Start => write!(f, "start"),
            Predecessor::After(c) => write!(f, "{c}"),
        }
    }
}

/// A small set of categories backed by a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct CategorySet(u8);

impl CategorySet {
    pub const EMPTY: CategorySet = CategorySet(0);
    pub const FULL: CategorySet = CategorySet(u8::MAX);

    pub const fn of(categories: &[Category]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < categories.len() {
            bits |= 1 << categories[i].index();
            i += 1;
        }
        CategorySet(bits)
    }

    pub const fn contains(self, category: Category) -> bool {
        self.0 & (1 << category.index()) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Members in enumeration order.
    pub fn iter(self) -> impl Iterator<Item = Category> {
        Category::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Category> for CategorySet {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        CategorySet(iter.into_iter().fold(0u8, |bits, c| bits | 1 << c.index()))
    }
}

impl fmt::Display for CategorySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.iter().map(Category::code).collect();
        write!(f, "[{}]", codes.join(", "))
    }
}
