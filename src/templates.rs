//! Contract template generator: balanced, SME-friendly starting points.
//! Static text with parameter substitution; missing parameters fall back to
//! bracketed placeholders so the output is always usable as a draft.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Every template type the service knows about. Only a subset has a renderer;
/// the rest are listed so the UI can show what is coming.
pub const TEMPLATE_TYPES: [&str; 10] = [
    "service-agreement",
    "vendor-contract",
    "employment-agreement",
    "consultant-agreement",
    "nda",
    "partnership-deed",
    "lease-agreement",
    "purchase-order",
    "software-license",
    "freelancer-agreement",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown template type `{0}`")]
    Unknown(String),
    #[error("no renderer available for `{0}` yet")]
    Unsupported(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateParams {
    /// Party names/addresses, e.g. "client", "client_address", "provider".
    #[serde(default)]
    pub parties: HashMap<String, String>,
    /// Commercial terms, e.g. "payment", "duration", "jurisdiction".
    #[serde(default)]
    pub terms: HashMap<String, String>,
}

impl TemplateParams {
    fn party(&self, key: &str, placeholder: &str) -> String {
        lookup(&self.parties, key, placeholder)
    }
    fn term(&self, key: &str, placeholder: &str) -> String {
        lookup(&self.terms, key, placeholder)
    }
}

fn lookup(map: &HashMap<String, String>, key: &str, placeholder: &str) -> String {
    map.get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| placeholder.to_string())
}

/// Render a template by kind.
pub fn render(kind: &str, params: &TemplateParams) -> Result<String, TemplateError> {
    match kind {
        "service-agreement" => Ok(service_agreement(params)),
        "nda" => Ok(nda(params)),
        "freelancer-agreement" => Ok(freelancer_agreement(params)),
        k if TEMPLATE_TYPES.contains(&k) => Err(TemplateError::Unsupported(k.to_string())),
        other => Err(TemplateError::Unknown(other.to_string())),
    }
}

/// What makes a fair contract of each type; generic fallback for the rest.
#[derive(Debug, Clone, Serialize)]
pub struct Guidelines {
    pub fair_terms: Vec<&'static str>,
    pub avoid: Vec<&'static str>,
}

pub fn guidelines(kind: &str) -> Guidelines {
    match kind {
        "service-agreement" => Guidelines {
            fair_terms: vec![
                "Mutual termination rights (60-90 days notice)",
                "Liability cap at 6-12 months of fees",
                "No automatic renewal",
                "Clear scope and deliverables",
                "Reasonable payment terms (30-45 days)",
            ],
            avoid: vec![
                "Unilateral termination by one party only",
                "Unlimited liability",
                "Excessive lock-in periods (over 2 years)",
                "Auto-renewal without consent",
                "Personal guarantees",
            ],
        },
        "employment-agreement" => Guidelines {
            fair_terms: vec![
                "Mutual notice period (1-3 months based on level)",
                "Limited non-compete (6-12 months, specific geography)",
                "Clear compensation and benefits",
                "IP created during work hours belongs to the company",
                "Reasonable working hours",
            ],
            avoid: vec![
                "One-sided termination rights",
                "Excessive non-compete (multi-year, nationwide, all industries)",
                "Personal guarantees for company losses",
                "Unpaid overtime expectations",
                "Perpetual confidentiality for non-trade secrets",
            ],
        },
        "nda" => Guidelines {
            fair_terms: vec![
                "Mutual obligations (both parties bound)",
                "Clear definition of confidential information",
                "Reasonable term (2-3 years)",
                "Exceptions for public info and prior knowledge",
                "No restriction on independent development",
            ],
            avoid: vec![
                "One-sided NDA (only one party bound)",
                "Perpetual confidentiality",
                "Overly broad definition of confidential information",
                "No exceptions",
                "Excessive penalties",
            ],
        },
        "freelancer-agreement" => Guidelines {
            fair_terms: vec![
                "Clear scope and deliverables",
                "Reasonable payment terms (Net 15-30)",
                "IP for specific work goes to the client",
                "Freelancer retains general tools and methods",
                "Limited non-compete during the project only",
            ],
            avoid: vec![
                "Full IP transfer including the freelancer's own tools",
                "Broad non-compete preventing industry work",
                "Personal liability for business outcomes",
                "Payment only after full project completion",
                "Unlimited revisions",
            ],
        },
        _ => Guidelines {
            fair_terms: vec!["Mutual obligations", "Clear terms", "Reasonable duration"],
            avoid: vec![
                "One-sided terms",
                "Unlimited liability",
                "Excessive restrictions",
            ],
        },
    }
}

fn service_agreement(p: &TemplateParams) -> String {
    format!(
        "SERVICE AGREEMENT\n\n\
This Service Agreement is entered into on {date}\n\n\
BETWEEN:\n\
{client}, having office at {client_address} (hereinafter referred to as \"Client\")\n\n\
AND:\n\
{provider}, having office at {provider_address} (hereinafter referred to as \"Service Provider\")\n\n\
WHEREAS both parties wish to enter into a mutually beneficial service arrangement.\n\n\
1. SERVICES\n\
The Service Provider shall provide the following services:\n\
{scope}\n\n\
2. TERM\n\
This Agreement shall be effective from {start_date} for an initial period of {duration}.\n\
2.1 Renewal: Either party may choose to renew by mutual written consent {renewal_notice} before expiry.\n\
2.2 No automatic renewal without explicit consent from both parties.\n\n\
3. COMPENSATION\n\
3.1 Service Fee: {payment} per {payment_frequency} plus applicable GST\n\
3.2 Payment Terms: Due within {payment_days} of invoice date\n\
3.3 Late Payment: {late_fee} per month interest after {grace_period} grace period\n\n\
4. TERMINATION\n\
4.1 Either party may terminate with {termination_notice} written notice\n\
4.2 Termination for cause (material breach) requires {cure_period} notice and opportunity to cure\n\
4.3 Upon termination, Client shall pay for services rendered until termination date\n\n\
5. INTELLECTUAL PROPERTY\n\
5.1 Pre-existing IP of each party remains with that party\n\
5.2 New IP created specifically for Client's project shall belong to Client\n\
5.3 Service Provider retains right to use generic methodologies and frameworks\n\
5.4 Service Provider may showcase work in portfolio with Client's prior written consent\n\n\
6. CONFIDENTIALITY\n\
6.1 Both parties shall maintain confidentiality of proprietary information\n\
6.2 Confidentiality obligation survives for {confidentiality_period} post-termination\n\
6.3 Excludes: publicly available information, information required by law to be disclosed\n\n\
7. LIABILITY AND INDEMNIFICATION\n\
7.1 Each party shall indemnify the other for breaches of this Agreement\n\
7.2 Total liability capped at {liability_cap}\n\
7.3 Neither party liable for indirect, consequential, or punitive damages\n\
7.4 Force majeure events exempt parties from liability\n\n\
8. INDEPENDENT CONTRACTOR\n\
Service Provider is an independent contractor, not an employee. Responsible for own taxes, insurance, and regulatory compliance.\n\n\
9. AMENDMENTS\n\
Any amendments must be in writing and signed by both parties. No unilateral changes permitted.\n\n\
10. DISPUTE RESOLUTION\n\
10.1 Disputes shall first be attempted to be resolved through good faith negotiations (30 days)\n\
10.2 If unresolved, parties may pursue mediation\n\
10.3 Arbitration under Arbitration and Conciliation Act, 1996\n\
10.4 Venue: {jurisdiction}\n\n\
11. GOVERNING LAW\n\
This Agreement shall be governed by the laws of India. Courts in {jurisdiction} shall have jurisdiction.\n\n\
12. ENTIRE AGREEMENT\n\
This Agreement constitutes the complete agreement between the parties and supersedes all prior discussions and understandings.\n\n\
AGREED AND ACCEPTED:\n\n\
For {client}: _____________________    For {provider}: _____________________\n\
Name:                                  Name:\n\
Designation:                           Designation:\n\
Date:                                  Date:\n",
        date = p.term("date", "[DATE]"),
        client = p.party("client", "[CLIENT NAME]"),
        client_address = p.party("client_address", "[CLIENT ADDRESS]"),
        provider = p.party("provider", "[PROVIDER NAME]"),
        provider_address = p.party("provider_address", "[PROVIDER ADDRESS]"),
        scope = p.term("scope", "[DESCRIBE SERVICES IN DETAIL]"),
        start_date = p.term("start_date", "[START DATE]"),
        duration = p.term("duration", "12 months"),
        renewal_notice = p.term("renewal_notice", "30 days"),
        payment = p.term("payment", "Rs. [AMOUNT]"),
        payment_frequency = p.term("payment_frequency", "month"),
        payment_days = p.term("payment_days", "30 days"),
        late_fee = p.term("late_fee", "1%"),
        grace_period = p.term("grace_period", "15 day"),
        termination_notice = p.term("termination_notice", "60 days"),
        cure_period = p.term("cure_period", "15 days"),
        confidentiality_period = p.term("confidentiality_period", "3 years"),
        liability_cap = p.term("liability_cap", "6 months of fees paid"),
        jurisdiction = p.term("jurisdiction", "[CITY]"),
    )
}

fn nda(p: &TemplateParams) -> String {
    format!(
        "NON-DISCLOSURE AGREEMENT (NDA)\n\n\
This Agreement is made on {date}\n\n\
BETWEEN:\n\
{party1}, having office at {party1_address} (\"Disclosing Party\")\n\n\
AND:\n\
{party2}, having office at {party2_address} (\"Receiving Party\")\n\n\
WHEREAS the parties wish to explore a business relationship and need to share confidential information.\n\n\
1. PURPOSE\n\
The parties wish to share confidential information for the purpose of: {purpose}\n\n\
2. CONFIDENTIAL INFORMATION\n\
\"Confidential Information\" means any information disclosed by one party to the other, whether orally or in writing, that is designated as confidential or that reasonably should be understood to be confidential.\n\
2.1 Includes: technical data, business plans, financial information, customer lists, trade secrets\n\
2.2 Excludes: publicly available information, information already known to the receiving party, information independently developed, information required to be disclosed by law\n\n\
3. OBLIGATIONS\n\
3.1 The Receiving Party shall maintain confidentiality using reasonable care, use information only for the stated purpose, not disclose to third parties without written consent, and return or destroy information upon request.\n\
3.2 This is a MUTUAL NDA - obligations apply to both parties.\n\n\
4. TERM\n\
This Agreement shall remain in effect for {duration} from the date of signing.\n\
Confidentiality obligations survive for {confidentiality_period} after termination.\n\n\
5. NO LICENSE\n\
This Agreement does not grant any license or rights to intellectual property.\n\n\
6. REMEDIES\n\
Breach of this Agreement may result in irreparable harm. Either party may seek injunctive relief and damages.\n\n\
7. GOVERNING LAW\n\
This Agreement is governed by Indian laws. Jurisdiction: {jurisdiction}.\n\n\
IN WITNESS WHEREOF, the parties have executed this Agreement.\n\n\
For {party1}: _____________________    For {party2}: _____________________\n\
Authorized Signatory                   Authorized Signatory\n\
Date:                                  Date:\n",
        date = p.term("date", "[DATE]"),
        party1 = p.party("party1", "[PARTY 1 NAME]"),
        party1_address = p.party("party1_address", "[ADDRESS]"),
        party2 = p.party("party2", "[PARTY 2 NAME]"),
        party2_address = p.party("party2_address", "[ADDRESS]"),
        purpose = p.term("purpose", "[STATE PURPOSE]"),
        duration = p.term("duration", "2 years"),
        confidentiality_period = p.term("confidentiality_period", "3 years"),
        jurisdiction = p.term("jurisdiction", "[CITY]"),
    )
}

fn freelancer_agreement(p: &TemplateParams) -> String {
    format!(
        "FREELANCER AGREEMENT\n\n\
This Agreement is made on {date}\n\n\
BETWEEN:\n\
{client}, having office at {client_address} (\"Client\")\n\n\
AND:\n\
{freelancer}, residing at {freelancer_address} (\"Freelancer\")\n\n\
1. SERVICES\n\
Freelancer shall provide the following services:\n\
{services}\n\n\
2. COMPENSATION\n\
2.1 Rate: {rate} per {rate_basis}\n\
2.2 Payment: {payment_terms} from invoice\n\
2.3 Expenses: {expenses}\n\n\
3. TERM\n\
Project-based work expected to complete by {completion_date}.\n\
Either party may terminate with {notice_period} notice.\n\n\
4. INTELLECTUAL PROPERTY\n\
4.1 Work Product: all deliverables created specifically for this project belong to Client\n\
4.2 Freelancer Tools: Freelancer retains rights to general tools, templates, and methodologies\n\
4.3 Attribution: Freelancer may showcase work in portfolio with Client consent\n\n\
5. INDEPENDENT CONTRACTOR\n\
Freelancer is an independent contractor, responsible for own taxes and GST registration, insurance, equipment and software, and work schedule.\n\n\
6. CONFIDENTIALITY\n\
Freelancer shall maintain confidentiality of Client information for {confidentiality}.\n\n\
7. NON-COMPETE (LIMITED)\n\
During the project term, Freelancer shall not work on directly competing projects for Client's direct competitors in the same niche.\n\
Note: this does NOT restrict Freelancer from working in the same industry generally.\n\n\
8. LIABILITY\n\
8.1 Freelancer liable only for direct damages caused by gross negligence\n\
8.2 Liability capped at total fees paid\n\
8.3 No liability for consequential or indirect damages\n\n\
9. DISPUTE RESOLUTION\n\
Disputes to be resolved through mediation, then arbitration in {jurisdiction}.\n\n\
10. GOVERNING LAW\n\
Governed by Indian laws. Jurisdiction: {jurisdiction}.\n\n\
AGREED:\n\n\
Client: _____________________          Freelancer: _____________________\n\
Date:                                  Date:\n",
        date = p.term("date", "[DATE]"),
        client = p.party("client", "[CLIENT NAME]"),
        client_address = p.party("client_address", "[ADDRESS]"),
        freelancer = p.party("freelancer", "[FREELANCER NAME]"),
        freelancer_address = p.party("freelancer_address", "[ADDRESS]"),
        services = p.term("services", "[DESCRIBE SERVICES]"),
        rate = p.term("rate", "Rs. [AMOUNT]"),
        rate_basis = p.term("rate_basis", "hour/day/project"),
        payment_terms = p.term("payment_terms", "Net 30 days"),
        expenses = p.term("expenses", "pre-approved expenses reimbursed with receipts"),
        completion_date = p.term("completion_date", "[DATE]"),
        notice_period = p.term("notice_period", "15 days"),
        confidentiality = p.term("confidentiality", "2 years"),
        jurisdiction = p.term("jurisdiction", "[CITY]"),
    )
}
