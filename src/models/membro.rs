// src/models/membro.rs
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{anulavel, genero::normalizar_genero, texto_opcional};
use crate::error::{erros_de_campo, AppError, AppResult, ErrosDeCampo};

/// Linha da tabela `membros`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct Membro {
    pub id: i64,
    pub usuario_responsavel: Option<i64>,
    pub nome_completo: String,
    pub cpf: String,
    pub rg: Option<String>,
    pub data_nascimento: NaiveDate,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub batizado: bool,
    pub data_batismo: Option<NaiveDate>,
    pub ministerio: Option<String>,
    pub ativo: bool,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
    pub genero: String,
    pub idade: Option<i64>,
}

/// Corpo de POST/PUT. Campos obrigatórios são `Option` para que a ausência
/// seja reportada campo a campo em vez de rejeitada pelo extractor.
/// Campos desconhecidos (`id`, `criado_em`, ...) são ignorados.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MembroPayload {
    #[validate(
        required(message = "Este campo é obrigatório."),
        length(max = 255, message = "Certifique-se de que este campo não tenha mais de 255 caracteres.")
    )]
    pub nome_completo: Option<String>,
    #[validate(
        required(message = "Este campo é obrigatório."),
        length(max = 14, message = "Certifique-se de que este campo não tenha mais de 14 caracteres.")
    )]
    pub cpf: Option<String>,
    #[validate(length(max = 20, message = "Certifique-se de que este campo não tenha mais de 20 caracteres."))]
    pub rg: Option<String>,
    #[validate(required(message = "Este campo é obrigatório."))]
    pub data_nascimento: Option<NaiveDate>,
    pub endereco: Option<String>,
    #[validate(length(max = 20, message = "Certifique-se de que este campo não tenha mais de 20 caracteres."))]
    pub telefone: Option<String>,
    #[validate(
        email(message = "Insira um endereço de email válido."),
        length(max = 254, message = "Certifique-se de que este campo não tenha mais de 254 caracteres.")
    )]
    pub email: Option<String>,
    pub batizado: Option<bool>,
    pub data_batismo: Option<NaiveDate>,
    #[validate(length(max = 255, message = "Certifique-se de que este campo não tenha mais de 255 caracteres."))]
    pub ministerio: Option<String>,
    pub ativo: Option<bool>,
    pub genero: Option<String>,
    #[validate(range(min = 0, message = "Certifique-se de que este valor seja maior ou igual a 0."))]
    pub idade: Option<i64>,
    pub usuario_responsavel: Option<i64>,
}

/// Corpo de PATCH: só os campos presentes são alterados; `null` limpa
/// campos opcionais.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembroPatch {
    pub nome_completo: Option<String>,
    pub cpf: Option<String>,
    #[serde(default, deserialize_with = "anulavel")]
    pub rg: Option<Option<String>>,
    pub data_nascimento: Option<NaiveDate>,
    #[serde(default, deserialize_with = "anulavel")]
    pub endereco: Option<Option<String>>,
    #[serde(default, deserialize_with = "anulavel")]
    pub telefone: Option<Option<String>>,
    #[serde(default, deserialize_with = "anulavel")]
    pub email: Option<Option<String>>,
    pub batizado: Option<bool>,
    #[serde(default, deserialize_with = "anulavel")]
    pub data_batismo: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "anulavel")]
    pub ministerio: Option<Option<String>>,
    pub ativo: Option<bool>,
    pub genero: Option<String>,
    #[serde(default, deserialize_with = "anulavel")]
    pub idade: Option<Option<i64>>,
    #[serde(default, deserialize_with = "anulavel")]
    pub usuario_responsavel: Option<Option<i64>>,
}

/// Dados já validados, prontos para INSERT/UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct DadosMembro {
    pub usuario_responsavel: Option<i64>,
    pub nome_completo: String,
    pub cpf: String,
    pub rg: Option<String>,
    pub data_nascimento: NaiveDate,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub batizado: bool,
    pub data_batismo: Option<NaiveDate>,
    pub ministerio: Option<String>,
    pub ativo: bool,
    pub genero: String,
    pub idade: Option<i64>,
}

/// Idade em anos completos na data `hoje`.
pub fn calcular_idade(nascimento: NaiveDate, hoje: NaiveDate) -> i64 {
    let mut anos = i64::from(hoje.year() - nascimento.year());
    if (hoje.month(), hoje.day()) < (nascimento.month(), nascimento.day()) {
        anos -= 1;
    }
    anos.max(0)
}

fn erro(erros: &mut ErrosDeCampo, campo: &str, mensagem: impl Into<String>) {
    erros
        .entry(campo.to_string())
        .or_default()
        .push(mensagem.into());
}

impl MembroPayload {
    /// Valida o pedido e devolve os dados normalizados. A idade é derivada
    /// de `data_nascimento` quando não é enviada.
    pub fn validar(self, hoje: NaiveDate) -> AppResult<DadosMembro> {
        // Texto em branco conta como ausente antes das regras de campo
        let payload = self.normalizado();
        let mut erros = match payload.validate() {
            Ok(()) => ErrosDeCampo::new(),
            Err(e) => erros_de_campo(&e),
        };

        if let Some(nascimento) = payload.data_nascimento {
            if nascimento > hoje {
                erro(&mut erros, "data_nascimento", "A data de nascimento não pode estar no futuro.");
            }
        }

        let genero = match normalizar_genero(payload.genero.as_deref()) {
            Ok(g) => g,
            Err(msg) => {
                erro(&mut erros, "genero", msg);
                String::new()
            }
        };

        if !erros.is_empty() {
            return Err(AppError::Validacao(erros));
        }

        let MembroPayload {
            nome_completo,
            cpf,
            rg,
            data_nascimento,
            endereco,
            telefone,
            email,
            batizado,
            data_batismo,
            ministerio,
            ativo,
            idade,
            usuario_responsavel,
            ..
        } = payload;
        let (Some(nome_completo), Some(cpf), Some(data_nascimento)) =
            (nome_completo, cpf, data_nascimento)
        else {
            return Err(AppError::InternalServerError);
        };

        let idade = idade.or_else(|| Some(calcular_idade(data_nascimento, hoje)));

        Ok(DadosMembro {
            usuario_responsavel,
            nome_completo,
            cpf,
            rg,
            data_nascimento,
            endereco,
            telefone,
            email,
            batizado: batizado.unwrap_or(false),
            data_batismo,
            ministerio,
            ativo: ativo.unwrap_or(true),
            genero,
            idade,
        })
    }

    fn normalizado(self) -> Self {
        Self {
            nome_completo: texto_opcional(self.nome_completo),
            cpf: texto_opcional(self.cpf),
            rg: texto_opcional(self.rg),
            endereco: texto_opcional(self.endereco),
            telefone: texto_opcional(self.telefone),
            email: texto_opcional(self.email),
            ministerio: texto_opcional(self.ministerio),
            ..self
        }
    }
}

impl Membro {
    /// Aplica um PATCH sobre o registo atual, produzindo um payload completo
    /// que passa pela mesma validação de um PUT.
    pub fn aplicar_patch(&self, patch: MembroPatch) -> MembroPayload {
        MembroPayload {
            nome_completo: Some(patch.nome_completo.unwrap_or_else(|| self.nome_completo.clone())),
            cpf: Some(patch.cpf.unwrap_or_else(|| self.cpf.clone())),
            rg: patch.rg.unwrap_or_else(|| self.rg.clone()),
            data_nascimento: Some(patch.data_nascimento.unwrap_or(self.data_nascimento)),
            endereco: patch.endereco.unwrap_or_else(|| self.endereco.clone()),
            telefone: patch.telefone.unwrap_or_else(|| self.telefone.clone()),
            email: patch.email.unwrap_or_else(|| self.email.clone()),
            batizado: Some(patch.batizado.unwrap_or(self.batizado)),
            data_batismo: patch.data_batismo.unwrap_or(self.data_batismo),
            ministerio: patch.ministerio.unwrap_or_else(|| self.ministerio.clone()),
            ativo: Some(patch.ativo.unwrap_or(self.ativo)),
            genero: Some(patch.genero.unwrap_or_else(|| self.genero.clone())),
            // Nova data de nascimento sem idade explícita: a idade volta a ser derivada
            idade: match (patch.idade, patch.data_nascimento) {
                (Some(idade), _) => idade,
                (None, Some(_)) => None,
                (None, None) => self.idade,
            },
            usuario_responsavel: patch.usuario_responsavel.unwrap_or(self.usuario_responsavel),
        }
    }
}
