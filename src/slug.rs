use unicode_normalization::UnicodeNormalization;

const UNKNOWN_AGENT: &str = "agente-desconhecido";

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

/// Turns an agent display name into the identifier the webhook expects
/// ("Atendente de Clínica" -> "atendente-de-clinica").
pub fn slugify_agent_name(name: &str) -> String {
    let stripped: String = name
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(stripped.len());
    for c in stripped.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    slug.trim_matches('-').to_string()
}

/// Slug of the last agent the user talked to, or the placeholder used when
/// contact info is collected before any agent was opened.
pub fn agent_slug_or_unknown(name: Option<&str>) -> String {
    match name {
        Some(n) if !n.trim().is_empty() => slugify_agent_name(n),
        _ => UNKNOWN_AGENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn strips_accents_and_hyphenates() {
        assert_eq!(slugify_agent_name("Atendente de Clínica"), "atendente-de-clinica");
        assert_eq!(slugify_agent_name("Agente de Cobrança"), "agente-de-cobranca");
    }

    #[test]
    fn drops_punctuation_and_collapses_separators() {
        assert_eq!(slugify_agent_name("  SDR -- Vendas!  "), "sdr-vendas");
        assert_eq!(slugify_agent_name("Suporte (24h) & Help"), "suporte-24h-help");
        assert_eq!(slugify_agent_name("snake_case name"), "snake_case-name");
    }

    #[test]
    fn unknown_agent_placeholder() {
        assert_eq!(agent_slug_or_unknown(None), "agente-desconhecido");
        assert_eq!(agent_slug_or_unknown(Some("  ")), "agente-desconhecido");
        assert_eq!(agent_slug_or_unknown(Some("Recepção")), "recepcao");
    }
}
