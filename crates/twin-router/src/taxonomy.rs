// SPDX-FileCopyrightText: 2026 Twin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword vocabulary for each intent, in Spanish and English.
//!
//! The same tables drive the keyword fallback classifier and the vocabulary
//! hints rendered into the classification instructions. Terms are stored
//! already normalized (lowercase, no diacritics) and match whole words only,
//! so each inflection that should count is listed explicitly.

use crate::classification::{DocumentSubType, Intent};

/// How strongly a matched term signals its intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermStrength {
    Strong,
    Weak,
}

/// The vocabulary of one non-generic intent.
#[derive(Debug)]
pub struct KeywordFamily {
    pub intent: Intent,
    /// One-line description used in the classification instructions.
    pub description: &'static str,
    pub strong: &'static [&'static str],
    pub weak: &'static [&'static str],
}

/// Keyword families in precedence order. The first family with a hit wins;
/// anything unmatched is `Generic`.
pub const PRECEDENCE: [KeywordFamily; 5] = [
    KeywordFamily {
        intent: Intent::InvoiceSearch,
        description: "invoices, receipts, expenses, payments, charges and spending totals",
        strong: &[
            "factura", "facturas", "invoice", "gasto", "expense", "paid", "facturado",
            "facturada", "facturacion", "invoices", "invoiced", "gastos", "gaste", "gastado",
            "gastada", "gastamos", "gastaste", "gastar", "expenses", "pagado", "pagada",
            "pagados", "pagadas", "pague", "pago", "pagos", "pagar", "pagamos", "payment",
            "payments", "charge", "charges", "charged", "recibo", "recibos", "receipt",
            "receipts", "cobro", "cobros", "cobrado", "cobrada", "cobraron", "cobrar", "bills",
            "billing", "importe", "importes",
        ],
        weak: &[
            "total", "totales", "compra", "compras", "compre", "comprado", "purchase",
            "purchases", "purchased", "spent", "spend", "spending", "proveedor", "proveedores",
            "vendor", "vendors", "suscripcion", "suscripciones", "subscription",
            "subscriptions",
        ],
    },
    KeywordFamily {
        intent: Intent::DocumentSearch,
        description: "formal documents such as contracts, licenses, certificates and legal papers",
        strong: &[
            "contrato", "contract", "licencia", "license", "certificado", "certificate",
            "contratos", "contracts", "licencias", "licenses", "licence", "licences",
            "certificados", "certificates", "diploma", "diplomas",
        ],
        weak: &[
            "documento", "documentos", "document", "documents", "legal", "escritura",
            "escrituras", "deed", "deeds", "poliza", "polizas", "policy", "insurance",
            "mi seguro", "seguro de vida", "seguro del coche", "seguro de hogar",
            "seguro medico", "notario", "notarial", "titulo", "titulos", "pasaporte",
            "passport",
        ],
    },
    KeywordFamily {
        intent: Intent::ProfileSearch,
        description: "the user's own personal data: name, email, phone, address, birthday",
        strong: &[
            "mi nombre", "my name", "mi email", "my email", "mi correo", "my e-mail",
            "mi direccion", "my address", "donde vivo", "where do i live", "where i live",
            "mi telefono", "my phone", "mi numero", "my number", "mi cumpleanos", "my birthday",
            "fecha de nacimiento", "date of birth", "mi edad", "how old am i",
            "cuantos anos tengo", "quien soy", "who am i", "mis datos", "my details",
        ],
        weak: &[
            "mi perfil", "my profile", "sobre mi", "about me", "mi informacion",
            "my information",
        ],
    },
    KeywordFamily {
        intent: Intent::ContactSearch,
        description: "other people in the user's address book and their phone, email or address",
        strong: &[
            "contacto", "contactos", "contact", "contacts", "telefono de", "numero de telefono",
            "phone of", "phone number of", "email de", "email of", "correo de", "e-mail of",
            "direccion de", "address of", "cumpleanos de", "birthday of", "'s phone",
            "'s email", "'s address", "'s birthday",
        ],
        weak: &[
            "telefono", "phone", "movil", "mobile", "whatsapp", "colleague", "colleagues",
            "companero", "companera", "companeros", "companeras",
        ],
    },
    KeywordFamily {
        intent: Intent::PhotoSearch,
        description: "photos, pictures, images and albums",
        strong: &[
            "foto", "fotos", "photo", "photos", "imagen", "imagenes", "fotografia",
            "fotografias", "photograph", "photographs", "image", "images", "picture",
            "pictures", "galeria", "gallery", "album", "albums", "albumes", "selfie", "selfies",
        ],
        weak: &["show me", "muestrame", "ensename", "find", "encuentra"],
    },
];

/// Nouns that, next to a capitalized name, point at someone else's contact data.
const CONTACT_NOUNS: &[&str] = &[
    "telefono", "phone", "email", "correo", "direccion", "address", "movil", "mobile",
    "cumpleanos", "birthday",
];

/// Lowercase and strip Spanish diacritics so terms can be matched as ASCII.
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// True when `term` occurs in `normalized` as a whole word or phrase.
///
/// Terms that begin with punctuation (`'s phone`) may start mid-word.
pub fn contains_term(normalized: &str, term: &str) -> bool {
    let anchored = term.chars().next().is_some_and(char::is_alphanumeric);
    normalized.match_indices(term).any(|(at, _)| {
        let starts_word = !anchored
            || normalized[..at]
                .chars()
                .next_back()
                .is_none_or(|prev| !prev.is_alphanumeric());
        let ends_word = normalized[at + term.len()..]
            .chars()
            .next()
            .is_none_or(|next| !next.is_alphanumeric());
        starts_word && ends_word
    })
}

/// First term of `terms` found in `normalized`.
pub fn first_match(normalized: &str, terms: &[&'static str]) -> Option<&'static str> {
    terms.iter().copied().find(|term| contains_term(normalized, term))
}

/// A keyword hit for one family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyMatch {
    pub intent: Intent,
    pub strength: TermStrength,
    pub term: String,
}

/// Walk the families in precedence order and return the first hit.
///
/// `question` is the raw text; capitalization is needed for the
/// contact-name rule.
pub fn match_families(question: &str) -> Option<FamilyMatch> {
    let normalized = normalize(question);
    PRECEDENCE.iter().find_map(|family| {
        if let Some(term) = first_match(&normalized, family.strong) {
            return Some(FamilyMatch {
                intent: family.intent,
                strength: TermStrength::Strong,
                term: term.to_string(),
            });
        }
        if family.intent == Intent::ContactSearch
            && let Some(name) = names_a_person_with_contact_noun(question, &normalized)
        {
            return Some(FamilyMatch {
                intent: family.intent,
                strength: TermStrength::Strong,
                term: name,
            });
        }
        first_match(&normalized, family.weak).map(|term| FamilyMatch {
            intent: family.intent,
            strength: TermStrength::Weak,
            term: term.to_string(),
        })
    })
}

/// A contact noun plus a capitalized word after the first one, e.g.
/// "Jorge Luna phone" or "móvil Ana". Returns the capitalized word.
fn names_a_person_with_contact_noun(question: &str, normalized: &str) -> Option<String> {
    first_match(normalized, CONTACT_NOUNS)?;
    question
        .split_whitespace()
        .skip(1)
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|word| word.chars().next().is_some_and(char::is_uppercase))
        .map(str::to_string)
}

/// Map document vocabulary to a sub-type.
pub fn document_sub_type(normalized: &str) -> DocumentSubType {
    const TABLE: &[(&[&str], DocumentSubType)] = &[
        (
            &["contrato", "contratos", "contract", "contracts", "alquiler", "lease"],
            DocumentSubType::Contracts,
        ),
        (
            &[
                "licencia", "licencias", "license", "licenses", "licence", "permiso", "permisos",
                "permit", "permits",
            ],
            DocumentSubType::Licenses,
        ),
        (
            &[
                "certificado", "certificados", "certificate", "certificates", "diploma",
                "diplomas", "titulo", "titulos",
            ],
            DocumentSubType::Certificates,
        ),
        (
            &[
                "legal", "escritura", "escrituras", "deed", "deeds", "notario", "notarial",
                "poliza", "polizas", "policy", "seguro", "insurance", "testamento",
            ],
            DocumentSubType::Legal,
        ),
    ];

    TABLE
        .iter()
        .find(|(terms, _)| first_match(normalized, terms).is_some())
        .map(|(_, sub)| *sub)
        .unwrap_or(DocumentSubType::Other)
}
