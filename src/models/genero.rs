// src/models/genero.rs

/// Códigos de género aceites e respetivo rótulo de exibição.
pub const GENEROS: &[(&str, &str)] = &[
    ("M", "Masculine"),
    ("F", "Feminine"),
    ("O", "Other"),
    ("N", "Prefers not to say"),
];

pub const GENERO_PADRAO: &str = "N";

pub fn genero_valido(codigo: &str) -> bool {
    GENEROS.iter().any(|(c, _)| *c == codigo)
}

/// Rótulo para o código; códigos desconhecidos são devolvidos tal como estão.
pub fn rotulo_genero(codigo: &str) -> String {
    GENEROS
        .iter()
        .find(|(c, _)| *c == codigo)
        .map(|(_, rotulo)| rotulo.to_string())
        .unwrap_or_else(|| codigo.to_string())
}

/// Normaliza o género recebido num pedido: vazio/ausente vira o padrão,
/// maiúsculas/minúsculas são ignoradas.
pub fn normalizar_genero(valor: Option<&str>) -> Result<String, String> {
    let codigo = valor
        .map(|v| v.trim().to_ascii_uppercase())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| GENERO_PADRAO.to_string());
    if genero_valido(&codigo) {
        Ok(codigo)
    } else {
        Err(format!("\"{}\" não é uma escolha válida.", codigo))
    }
}
