//! Utilitários para exibir credenciais em logs sem vazá-las

/// Mantém apenas os primeiros `visible` caracteres de um segredo
///
/// Corta sempre em limite de caractere (nunca no meio de um code point UTF-8)
/// e substitui o restante por `...`. Segredos curtos demais são mascarados
/// por completo.
///
/// # Exemplo
/// ```
/// use bling_token_service::utils::string_utils::mask_token;
///
/// assert_eq!(mask_token("abcdef123456", 4), "abcd...");
/// assert_eq!(mask_token("abc", 4), "***");
/// ```
pub fn mask_token(token: &str, visible: usize) -> String {
    let total = token.chars().count();
    if total <= visible {
        return "*".repeat(total);
    }

    let prefix: String = token.chars().take(visible).collect();
    format!("{}...", prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token_ascii() {
        assert_eq!(mask_token("access-token-value", 6), "access...");
    }

    #[test]
    fn test_mask_token_short_secret_fully_hidden() {
        assert_eq!(mask_token("ab", 10), "**");
        assert_eq!(mask_token("", 3), "");
    }

    #[test]
    fn test_mask_token_utf8_boundary() {
        // "ção" tem caracteres multibyte; o corte não pode quebrar nenhum deles
        assert_eq!(mask_token("açãoxyz", 3), "açã...");
    }
}
