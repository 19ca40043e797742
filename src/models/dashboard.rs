// src/models/dashboard.rs
use serde::{ser::SerializeMap, Serialize, Serializer};

/// Faixa etária inclusiva. `max = None` representa uma faixa aberta ("51+").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaixaEtaria {
    pub rotulo: String,
    pub min: i64,
    pub max: Option<i64>,
}

impl FaixaEtaria {
    pub fn fechada(min: i64, max: i64) -> Self {
        Self {
            rotulo: format!("{}-{}", min, max),
            min,
            max: Some(max),
        }
    }

    pub fn aberta(min: i64) -> Self {
        Self {
            rotulo: format!("{}+", min),
            min,
            max: None,
        }
    }

    pub fn contem(&self, idade: i64) -> bool {
        idade >= self.min && self.max.map_or(true, |max| idade <= max)
    }

    /// Interpreta "18-25" ou "51+".
    pub fn parse(texto: &str) -> Result<Self, String> {
        let texto = texto.trim();
        let numero = |s: &str| {
            s.trim()
                .parse::<i64>()
                .ok()
                .filter(|n| *n >= 0)
                .ok_or_else(|| format!("faixa etária inválida: '{}'", texto))
        };
        if let Some(min) = texto.strip_suffix('+') {
            return Ok(Self::aberta(numero(min)?));
        }
        let (min, max) = texto
            .split_once('-')
            .ok_or_else(|| format!("faixa etária inválida: '{}'", texto))?;
        let (min, max) = (numero(min)?, numero(max)?);
        if min > max {
            return Err(format!("faixa etária com início depois do fim: '{}'", texto));
        }
        Ok(Self::fechada(min, max))
    }

    /// Lista separada por vírgulas, ex.: "0-17,18-25,26-35,36-50,51+".
    pub fn parse_lista(texto: &str) -> Result<Vec<Self>, String> {
        let faixas = texto
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(Self::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if faixas.is_empty() {
            return Err("lista de faixas etárias vazia".into());
        }
        Ok(faixas)
    }
}

/// Faixas usadas por omissão, tanto para usuários como para membros.
pub fn faixas_padrao() -> Vec<FaixaEtaria> {
    vec![
        FaixaEtaria::fechada(0, 17),
        FaixaEtaria::fechada(18, 25),
        FaixaEtaria::fechada(26, 35),
        FaixaEtaria::fechada(36, 50),
        FaixaEtaria::aberta(51),
    ]
}

/// Histograma por faixa, serializado como objeto JSON na ordem das faixas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Histograma(pub Vec<(String, i64)>);

impl Histograma {
    /// Distribui contagens `(idade, total)` pelas faixas. Cada idade conta
    /// em todas as faixas que a contêm; idades fora de qualquer faixa são
    /// ignoradas.
    pub fn distribuir(faixas: &[FaixaEtaria], contagens: &[(i64, i64)]) -> Self {
        Histograma(
            faixas
                .iter()
                .map(|faixa| {
                    let total = contagens
                        .iter()
                        .filter(|(idade, _)| faixa.contem(*idade))
                        .map(|(_, n)| n)
                        .sum::<i64>();
                    (faixa.rotulo.clone(), total)
                })
                .collect(),
        )
    }

    pub fn get(&self, rotulo: &str) -> Option<i64> {
        self.0.iter().find(|(r, _)| r == rotulo).map(|(_, n)| *n)
    }
}

impl Serialize for Histograma {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (rotulo, total) in &self.0 {
            map.serialize_entry(rotulo, total)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContagemGenero {
    pub genero: String,
    pub codigo: String,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, sqlx::FromRow)]
pub struct ContagemMinisterio {
    pub ministerio: String,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UsuarioStats {
    pub total: i64,
    pub ativos: i64,
    pub inativos: i64,
    pub por_genero: Vec<ContagemGenero>,
    pub por_faixa_etaria: Histograma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MembroStats {
    pub total: i64,
    pub ativos: i64,
    pub inativos: i64,
    pub batizados: i64,
    pub recentes_30_dias: i64,
    pub por_genero: Vec<ContagemGenero>,
    pub por_faixa_etaria: Histograma,
    pub por_ministerio: Vec<ContagemMinisterio>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResumoMembros {
    pub total: i64,
    pub ativos: i64,
    pub inativos: i64,
    pub batizados: i64,
    pub recentes_30_dias: i64,
}

/// Payload de `/dashboard/`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Dashboard {
    pub usuarios: UsuarioStats,
    pub membros: ResumoMembros,
    pub por_genero: Vec<ContagemGenero>,
    pub por_faixa_etaria: Histograma,
    pub por_ministerio: Vec<ContagemMinisterio>,
}

impl Dashboard {
    pub fn new(usuarios: UsuarioStats, membros: MembroStats) -> Self {
        Self {
            usuarios,
            membros: ResumoMembros {
                total: membros.total,
                ativos: membros.ativos,
                inativos: membros.inativos,
                batizados: membros.batizados,
                recentes_30_dias: membros.recentes_30_dias,
            },
            por_genero: membros.por_genero,
            por_faixa_etaria: membros.por_faixa_etaria,
            por_ministerio: membros.por_ministerio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limites_das_faixas_padrao() {
        let h = Histograma::distribuir(&faixas_padrao(), &[(17, 1), (18, 1), (25, 2), (51, 1), (90, 1)]);
        assert_eq!(h.get("0-17"), Some(1));
        assert_eq!(h.get("18-25"), Some(3));
        assert_eq!(h.get("26-35"), Some(0));
        assert_eq!(h.get("36-50"), Some(0));
        assert_eq!(h.get("51+"), Some(2));
    }

    #[test]
    fn parse_de_faixas() {
        assert_eq!(FaixaEtaria::parse("18-25").unwrap(), FaixaEtaria::fechada(18, 25));
        assert_eq!(FaixaEtaria::parse(" 60+ ").unwrap(), FaixaEtaria::aberta(60));
        assert!(FaixaEtaria::parse("30-20").is_err());
        assert!(FaixaEtaria::parse("abc").is_err());
        assert!(FaixaEtaria::parse_lista("").is_err());
        assert_eq!(
            FaixaEtaria::parse_lista("0-17,18-25,26-35,36-50,51+").unwrap(),
            faixas_padrao()
        );
    }

    #[test]
    fn histograma_mantem_ordem_no_json() {
        let h = Histograma::distribuir(&faixas_padrao(), &[]);
        let json = serde_json::to_string(&h).unwrap();
        assert_eq!(json, r#"{"0-17":0,"18-25":0,"26-35":0,"36-50":0,"51+":0}"#);
    }
}
