// src/services/transformers.rs

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};
use std::str::FromStr;

use crate::common::error::AppError;
use crate::models::lead::LeadDraft;

// ---
// O contrato de transformação
// ---
// Cada provedor de origem tem um transformador próprio, registrado pela tag
// gravada no endpoint. O despacho é pela tag, nunca por inspeção de campos
// do payload.

pub trait LeadTransformer: Send + Sync {
    /// A tag registrada no campo `provider` do endpoint.
    fn provider(&self) -> &'static str;

    /// Converte o payload bruto no rascunho canônico de lead.
    fn transform(&self, payload: &Value) -> Result<LeadDraft, AppError>;
}

static REGISTRY: [&'static dyn LeadTransformer; 6] = [
    &GenericTransformer,
    &FacebookLeadsTransformer,
    &GoogleFormsTransformer,
    &MailchimpTransformer,
    &HubSpotTransformer,
    &SalesforceTransformer,
];

pub fn transformer_for(provider: &str) -> Option<&'static dyn LeadTransformer> {
    REGISTRY.iter().copied().find(|t| t.provider() == provider)
}

pub fn known_providers() -> Vec<&'static str> {
    REGISTRY.iter().map(|t| t.provider()).collect()
}

// ---
// Helpers compartilhados
// ---

fn as_object(payload: &Value) -> Result<&Map<String, Value>, AppError> {
    payload
        .as_object()
        .ok_or_else(|| AppError::PayloadInvalid("o corpo deve ser um objeto JSON".into()))
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Política de resolução de nome: `name` explícito, senão
/// `first_name + " " + last_name`, senão `full_name`, senão "Unknown".
fn resolve_name(map: &Map<String, Value>) -> String {
    if let Some(name) = string_field(map, "name") {
        return name;
    }

    let parts: Vec<String> = ["first_name", "last_name"]
        .iter()
        .filter_map(|key| string_field(map, key))
        .collect();
    if !parts.is_empty() {
        return parts.join(" ");
    }

    if let Some(full) = string_field(map, "full_name") {
        return full;
    }

    "Unknown".to_string()
}

/// Ausente ou não numérico vira 0, nunca erro.
fn parse_value(value: Option<&Value>) -> Decimal {
    match value {
        Some(Value::Number(n)) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .unwrap_or(Decimal::ZERO),
        Some(Value::String(s)) => Decimal::from_str(s.trim()).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    }
}

fn string_tags(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

// ---
// 1. Payload customizado genérico
// ---
// Forma documentada: name|email|phone|company|source|value|notes|custom_fields.

pub struct GenericTransformer;

impl LeadTransformer for GenericTransformer {
    fn provider(&self) -> &'static str {
        "generic"
    }

    fn transform(&self, payload: &Value) -> Result<LeadDraft, AppError> {
        let map = as_object(payload)?;

        Ok(LeadDraft {
            name: resolve_name(map),
            email: string_field(map, "email"),
            phone: string_field(map, "phone"),
            company: string_field(map, "company"),
            source: string_field(map, "source").unwrap_or_else(|| "webhook".to_string()),
            value: parse_value(map.get("value")),
            status: string_field(map, "status"),
            tags: string_tags(map, "tags"),
            notes: string_field(map, "notes"),
            custom_fields: map
                .get("custom_fields")
                .filter(|v| v.is_object())
                .cloned()
                .unwrap_or_else(|| json!({})),
        })
    }
}

// ---
// 2. Facebook Lead Ads
// ---
// Entrega um array `field_data` de pares {name, values: [..]}.

pub struct FacebookLeadsTransformer;

impl LeadTransformer for FacebookLeadsTransformer {
    fn provider(&self) -> &'static str {
        "facebook_lead_ads"
    }

    fn transform(&self, payload: &Value) -> Result<LeadDraft, AppError> {
        let map = as_object(payload)?;
        let field_data = map
            .get("field_data")
            .and_then(|v| v.as_array())
            .ok_or_else(|| AppError::PayloadInvalid("field_data ausente ou inválido".into()))?;

        // Achata field_data em um mapa nome -> primeiro valor.
        let mut flat = Map::new();
        for entry in field_data {
            let Some(field_name) = entry.get("name").and_then(|v| v.as_str()) else {
                continue;
            };
            let first_value = entry
                .get("values")
                .and_then(|v| v.as_array())
                .and_then(|arr| arr.first())
                .cloned()
                .unwrap_or(Value::Null);
            flat.insert(field_name.to_string(), first_value);
        }

        let mut custom = Map::new();
        for (key, value) in &flat {
            if !matches!(
                key.as_str(),
                "full_name" | "first_name" | "last_name" | "email" | "phone_number" | "company_name"
            ) {
                custom.insert(key.clone(), value.clone());
            }
        }

        Ok(LeadDraft {
            name: resolve_name(&flat),
            email: string_field(&flat, "email"),
            phone: string_field(&flat, "phone_number"),
            company: string_field(&flat, "company_name"),
            source: "facebook_lead_ads".to_string(),
            custom_fields: Value::Object(custom),
            ..LeadDraft::default()
        })
    }
}

// ---
// 3. Google Forms (via Apps Script)
// ---
// Entrega `responses`: array de {title, answer}; o casamento dos campos
// conhecidos é por palavra-chave no título.

pub struct GoogleFormsTransformer;

impl LeadTransformer for GoogleFormsTransformer {
    fn provider(&self) -> &'static str {
        "google_forms"
    }

    fn transform(&self, payload: &Value) -> Result<LeadDraft, AppError> {
        let map = as_object(payload)?;
        let responses = map
            .get("responses")
            .and_then(|v| v.as_array())
            .ok_or_else(|| AppError::PayloadInvalid("responses ausente ou inválido".into()))?;

        let mut draft = LeadDraft {
            source: "google_forms".to_string(),
            ..LeadDraft::default()
        };
        let mut custom = Map::new();

        for response in responses {
            let Some(title) = response.get("title").and_then(|v| v.as_str()) else {
                continue;
            };
            let answer = response
                .get("answer")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .filter(|s| !s.is_empty());
            let Some(answer) = answer else { continue };

            let lowered = title.to_lowercase();
            if lowered.contains("mail") {
                draft.email = Some(answer.to_string());
            } else if lowered.contains("phone") || lowered.contains("telefone") {
                draft.phone = Some(answer.to_string());
            } else if lowered.contains("company") || lowered.contains("empresa") {
                draft.company = Some(answer.to_string());
            } else if lowered.contains("name") || lowered.contains("nome") {
                draft.name = answer.to_string();
            } else {
                custom.insert(title.to_string(), Value::String(answer.to_string()));
            }
        }

        draft.custom_fields = Value::Object(custom);
        Ok(draft)
    }
}

// ---
// 4. Mailchimp
// ---
// Entrega `data` com `email` e o mapa `merges` (FNAME/LNAME/PHONE/COMPANY).

pub struct MailchimpTransformer;

impl LeadTransformer for MailchimpTransformer {
    fn provider(&self) -> &'static str {
        "mailchimp"
    }

    fn transform(&self, payload: &Value) -> Result<LeadDraft, AppError> {
        let map = as_object(payload)?;
        let data = map
            .get("data")
            .and_then(|v| v.as_object())
            .ok_or_else(|| AppError::PayloadInvalid("data ausente ou inválido".into()))?;

        let merges = data.get("merges").and_then(|v| v.as_object());

        let mut name_map = Map::new();
        if let Some(merges) = merges {
            if let Some(fname) = merges.get("FNAME") {
                name_map.insert("first_name".to_string(), fname.clone());
            }
            if let Some(lname) = merges.get("LNAME") {
                name_map.insert("last_name".to_string(), lname.clone());
            }
        }

        Ok(LeadDraft {
            name: resolve_name(&name_map),
            email: string_field(data, "email"),
            phone: merges.and_then(|m| string_field(m, "PHONE")),
            company: merges.and_then(|m| string_field(m, "COMPANY")),
            source: "mailchimp".to_string(),
            ..LeadDraft::default()
        })
    }
}

// ---
// 5. HubSpot
// ---
// Entrega `properties`; cada propriedade pode ser um valor direto ou um
// objeto {value: ...}.

pub struct HubSpotTransformer;

fn hubspot_prop(properties: &Map<String, Value>, key: &str) -> Option<String> {
    let prop = properties.get(key)?;
    let text = match prop {
        Value::String(s) => s.as_str(),
        Value::Object(obj) => obj.get("value")?.as_str()?,
        _ => return None,
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

impl LeadTransformer for HubSpotTransformer {
    fn provider(&self) -> &'static str {
        "hubspot"
    }

    fn transform(&self, payload: &Value) -> Result<LeadDraft, AppError> {
        let map = as_object(payload)?;
        let properties = map
            .get("properties")
            .and_then(|v| v.as_object())
            .ok_or_else(|| AppError::PayloadInvalid("properties ausente ou inválido".into()))?;

        let mut name_map = Map::new();
        if let Some(first) = hubspot_prop(properties, "firstname") {
            name_map.insert("first_name".to_string(), Value::String(first));
        }
        if let Some(last) = hubspot_prop(properties, "lastname") {
            name_map.insert("last_name".to_string(), Value::String(last));
        }

        Ok(LeadDraft {
            name: resolve_name(&name_map),
            email: hubspot_prop(properties, "email"),
            phone: hubspot_prop(properties, "phone"),
            company: hubspot_prop(properties, "company"),
            source: "hubspot".to_string(),
            ..LeadDraft::default()
        })
    }
}

// ---
// 6. Salesforce
// ---
// Campos com as iniciais maiúsculas do objeto Lead do Salesforce.

pub struct SalesforceTransformer;

impl LeadTransformer for SalesforceTransformer {
    fn provider(&self) -> &'static str {
        "salesforce"
    }

    fn transform(&self, payload: &Value) -> Result<LeadDraft, AppError> {
        let map = as_object(payload)?;

        let mut name_map = Map::new();
        if let Some(first) = string_field(map, "FirstName") {
            name_map.insert("first_name".to_string(), Value::String(first));
        }
        if let Some(last) = string_field(map, "LastName") {
            name_map.insert("last_name".to_string(), Value::String(last));
        }

        Ok(LeadDraft {
            name: resolve_name(&name_map),
            email: string_field(map, "Email"),
            phone: string_field(map, "Phone"),
            company: string_field(map, "Company"),
            source: "salesforce".to_string(),
            value: parse_value(map.get("AnnualRevenue")),
            ..LeadDraft::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(provider: &str, payload: Value) -> LeadDraft {
        transformer_for(provider)
            .expect("transformador registrado")
            .transform(&payload)
            .expect("payload de teste válido")
    }

    #[test]
    fn generico_prefere_o_campo_name() {
        let draft = transform("generic", json!({"name": "Jane Doe", "first_name": "A"}));
        assert_eq!(draft.name, "Jane Doe");
    }

    #[test]
    fn generico_concatena_first_e_last_name() {
        let draft = transform("generic", json!({"first_name": "A", "last_name": "B"}));
        assert_eq!(draft.name, "A B");
    }

    #[test]
    fn generico_cai_para_full_name() {
        let draft = transform("generic", json!({"full_name": "C D"}));
        assert_eq!(draft.name, "C D");
    }

    #[test]
    fn generico_sem_nenhum_nome_vira_unknown() {
        let draft = transform("generic", json!({"email": "x@y.com"}));
        assert_eq!(draft.name, "Unknown");
    }

    #[test]
    fn generico_mapeia_o_payload_documentado() {
        let draft = transform(
            "generic",
            json!({"name": "Jane Doe", "email": "jane@x.com", "value": "2500"}),
        );
        assert_eq!(draft.name, "Jane Doe");
        assert_eq!(draft.email.as_deref(), Some("jane@x.com"));
        assert_eq!(draft.value, Decimal::from(2500));
        assert_eq!(draft.source, "webhook");
        assert_eq!(draft.status, None);
    }

    #[test]
    fn valor_ausente_ou_nao_numerico_vira_zero() {
        let sem_valor = transform("generic", json!({"name": "X"}));
        assert_eq!(sem_valor.value, Decimal::ZERO);

        let texto = transform("generic", json!({"name": "X", "value": "muito"}));
        assert_eq!(texto.value, Decimal::ZERO);

        let numero = transform("generic", json!({"name": "X", "value": 120.5}));
        assert_eq!(numero.value, Decimal::from_str("120.5").unwrap());
    }

    #[test]
    fn generico_respeita_source_do_payload() {
        let draft = transform("generic", json!({"name": "X", "source": "landing-page"}));
        assert_eq!(draft.source, "landing-page");
    }

    #[test]
    fn corpo_que_nao_e_objeto_e_payload_invalido() {
        let result = GenericTransformer.transform(&json!([1, 2, 3]));
        assert!(matches!(result, Err(AppError::PayloadInvalid(_))));
    }

    #[test]
    fn facebook_achata_field_data() {
        let draft = transform(
            "facebook_lead_ads",
            json!({
                "field_data": [
                    {"name": "full_name", "values": ["Maria Souza"]},
                    {"name": "email", "values": ["maria@x.com"]},
                    {"name": "phone_number", "values": ["+5511999990000"]},
                    {"name": "cidade", "values": ["Campinas"]}
                ]
            }),
        );
        assert_eq!(draft.name, "Maria Souza");
        assert_eq!(draft.email.as_deref(), Some("maria@x.com"));
        assert_eq!(draft.phone.as_deref(), Some("+5511999990000"));
        assert_eq!(draft.source, "facebook_lead_ads");
        assert_eq!(draft.custom_fields["cidade"], json!("Campinas"));
    }

    #[test]
    fn google_forms_casa_titulos_por_palavra_chave() {
        let draft = transform(
            "google_forms",
            json!({
                "responses": [
                    {"title": "Qual o seu nome?", "answer": "João Lima"},
                    {"title": "E-mail de contato", "answer": "joao@x.com"},
                    {"title": "Telefone", "answer": "11 98888-7777"},
                    {"title": "Como nos conheceu?", "answer": "Instagram"}
                ]
            }),
        );
        assert_eq!(draft.name, "João Lima");
        assert_eq!(draft.email.as_deref(), Some("joao@x.com"));
        assert_eq!(draft.phone.as_deref(), Some("11 98888-7777"));
        assert_eq!(draft.custom_fields["Como nos conheceu?"], json!("Instagram"));
    }

    #[test]
    fn mailchimp_usa_merges() {
        let draft = transform(
            "mailchimp",
            json!({
                "data": {
                    "email": "ana@x.com",
                    "merges": {"FNAME": "Ana", "LNAME": "Reis", "PHONE": "1199"}
                }
            }),
        );
        assert_eq!(draft.name, "Ana Reis");
        assert_eq!(draft.email.as_deref(), Some("ana@x.com"));
        assert_eq!(draft.phone.as_deref(), Some("1199"));
        assert_eq!(draft.source, "mailchimp");
    }

    #[test]
    fn hubspot_aceita_propriedade_direta_ou_objeto_value() {
        let draft = transform(
            "hubspot",
            json!({
                "properties": {
                    "firstname": {"value": "Carla"},
                    "lastname": "Nunes",
                    "email": {"value": "carla@x.com"}
                }
            }),
        );
        assert_eq!(draft.name, "Carla Nunes");
        assert_eq!(draft.email.as_deref(), Some("carla@x.com"));
    }

    #[test]
    fn salesforce_usa_campos_capitalizados() {
        let draft = transform(
            "salesforce",
            json!({
                "FirstName": "Pedro",
                "LastName": "Alves",
                "Email": "pedro@x.com",
                "Company": "Acme",
                "AnnualRevenue": 100000
            }),
        );
        assert_eq!(draft.name, "Pedro Alves");
        assert_eq!(draft.company.as_deref(), Some("Acme"));
        assert_eq!(draft.value, Decimal::from(100000));
        assert_eq!(draft.source, "salesforce");
    }

    #[test]
    fn despacho_e_pela_tag_do_provedor() {
        assert!(transformer_for("generic").is_some());
        assert!(transformer_for("hubspot").is_some());
        assert!(transformer_for("inexistente").is_none());
        assert_eq!(known_providers().len(), 6);
    }
}
