// src/models/mod.rs
pub mod dashboard;
pub mod genero;
pub mod membro;
pub mod usuario;

use serde::{Deserialize, Deserializer};

/// Distingue um campo ausente (`None`) de um `null` explícito (`Some(None)`)
/// em pedidos PATCH. Usar com `#[serde(default, deserialize_with = "anulavel")]`.
pub(crate) fn anulavel<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Remove espaços e converte texto vazio em `None`.
pub(crate) fn texto_opcional(valor: Option<String>) -> Option<String> {
    valor
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
