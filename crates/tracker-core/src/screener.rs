//! Financial-sector keyword screening.
//!
//! Companies and opportunity types are checked against blocklists before an
//! entry is written. Matching is a case-insensitive substring search, so
//! `"ABC Bank"` trips both `"bank"` and nothing else.

/// Terms that mark a company as operating in financial services.
pub const BLOCKED_COMPANY_KEYWORDS: &[&str] = &[
    // Banking & fintech
    "fintech", "finance", "financing", "financial", "bank", "banking", "banks",
    "neobank", "digital bank", "open bank", "commercial bank", "retail bank",
    "microfinance", "micro finance", "nbfc", "non-banking", "mfi",
    // Insurance
    "insurance", "insure", "insurer", "assurance", "reinsurance",
    "life insurance", "health insurance", "general insurance",
    // Investment & trading
    "investment", "invest", "investor", "capital", "venture capital", "vc fund",
    "private equity", "securities", "trading", "trader", "stock broker", "stockbroker",
    "stock market", "share market", "nse", "bse", "forex", "commodity", "derivatives",
    "equity", "hedge fund", "mutual fund", "asset management", "amc",
    // Credit & lending
    "credit", "loan", "lending", "lender", "mortgage", "home loan",
    "personal loan", "business loan", "creditor", "bnpl", "buy now pay later",
    "gold loan", "chit fund", "pawn",
    // Payments & wallets
    "payment", "payments", "pay", "upi", "wallet", "e-wallet", "digital wallet",
    "payment gateway", "payment processor", "merchant services", "remittance",
    "money transfer", "pos", "point of sale",
    // Crypto
    "crypto", "cryptocurrency", "bitcoin", "defi", "crypto exchange",
    "crypto wallet", "digital currency", "blockchain finance",
    // Wealth management & advisory
    "wealth", "wealth management", "portfolio", "fund management", "treasury",
    "financial advisor", "financial planning",
    // Accounting & taxation
    "accounting", "accounting software", "bookkeeping", "payroll",
    "tax", "tax software", "tax filing", "audit firm", "chartered accountant",
    // Institutions & other services
    "credit union", "financial institution", "financial services",
    "acquirer", "issuer", "leasing", "factoring", "monetary", "fiscal",
];

/// Terms that mark an opportunity type as finance-related.
pub const BLOCKED_OPPORTUNITY_KEYWORDS: &[&str] = &[
    "finance", "financial", "bank", "banking", "fintech", "investment",
    "investor", "trading", "trader", "stock", "forex", "equity", "hedge",
    "mutual fund", "wealth", "loan", "credit", "mortgage", "insurance",
    "actuarial", "underwriting", "tax", "accounting", "audit", "portfolio",
    "treasury", "fund management", "private equity", "venture capital",
    "asset management", "payment", "wallet", "digital currency", "crypto",
    "defi", "broker", "brokerage",
];

/// Return every term from `blocked` that occurs in `value`, in list order.
pub fn find_blocked_keywords<S: AsRef<str>>(value: Option<&str>, blocked: &[S]) -> Vec<String> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Vec::new();
    };
    let lowered = value.to_lowercase();
    blocked
        .iter()
        .map(AsRef::as_ref)
        .filter(|term| lowered.contains(*term))
        .map(str::to_string)
        .collect()
}

/// Which screened field triggered a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenedField {
    Company,
    OpportunityType,
}

impl ScreenedField {
    /// Message returned to clients when this field is blocked.
    pub fn rejection_message(&self) -> &'static str {
        match self {
            ScreenedField::Company => "Financial company detected",
            ScreenedField::OpportunityType => "Financial opportunity detected",
        }
    }
}

/// Blocklists in effect for a running service.
///
/// Starts from the built-in lists; deployments may append terms.
#[derive(Debug, Clone)]
pub struct KeywordScreener {
    company: Vec<String>,
    opportunity: Vec<String>,
}

impl Default for KeywordScreener {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordScreener {
    pub fn new() -> Self {
        Self {
            company: BLOCKED_COMPANY_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            opportunity: BLOCKED_OPPORTUNITY_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Append extra terms. Terms are lower-cased; blanks and duplicates are dropped.
    pub fn with_extra(mut self, company: &[String], opportunity: &[String]) -> Self {
        extend_unique(&mut self.company, company);
        extend_unique(&mut self.opportunity, opportunity);
        self
    }

    pub fn company_matches(&self, company: Option<&str>) -> Vec<String> {
        find_blocked_keywords(company, &self.company)
    }

    pub fn opportunity_matches(&self, opportunity_type: Option<&str>) -> Vec<String> {
        find_blocked_keywords(opportunity_type, &self.opportunity)
    }

    /// Screen the write-path fields. The company is checked first; the first
    /// field with any match is reported.
    pub fn screen_entry(
        &self,
        company: &str,
        opportunity_type: Option<&str>,
    ) -> Option<(ScreenedField, Vec<String>)> {
        let company_hits = self.company_matches(Some(company));
        if !company_hits.is_empty() {
            return Some((ScreenedField::Company, company_hits));
        }
        let type_hits = self.opportunity_matches(opportunity_type);
        if !type_hits.is_empty() {
            return Some((ScreenedField::OpportunityType, type_hits));
        }
        None
    }
}

fn extend_unique(list: &mut Vec<String>, extra: &[String]) {
    for term in extra {
        let term = term.trim().to_lowercase();
        if !term.is_empty() && !list.contains(&term) {
            list.push(term);
        }
    }
}
