// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use std::collections::HashSet;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::workspace::MemberStatus;

// ---
// 1. O modelo tipado de permissões
// ---
// Em vez de comparar strings soltas, cada slug "recurso:acao" é convertido
// para este modelo na entrada. O formato texto só existe na API e no banco.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Workspaces,
    Members,
    Roles,
    Leads,
    Webhooks,
    Activities,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Workspaces,
        Resource::Members,
        Resource::Roles,
        Resource::Leads,
        Resource::Webhooks,
        Resource::Activities,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Workspaces => "workspaces",
            Resource::Members => "members",
            Resource::Roles => "roles",
            Resource::Leads => "leads",
            Resource::Webhooks => "webhooks",
            Resource::Activities => "activities",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|r| r.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Assign,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Assign,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Assign => "assign",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == s)
    }
}

// Os seletores carregam o curinga como variante explícita ("*").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceSelector {
    Any,
    One(Resource),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionSelector {
    Any,
    One(Action),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permission {
    pub resource: ResourceSelector,
    pub action: ActionSelector,
}

impl Permission {
    /// O curinga total "*:*".
    pub const fn all() -> Self {
        Permission {
            resource: ResourceSelector::Any,
            action: ActionSelector::Any,
        }
    }

    /// Converte um slug "recurso:acao" para o modelo tipado.
    /// Slug desconhecido é erro de validação, não permissão silenciosa.
    pub fn parse(slug: &str) -> Result<Self, AppError> {
        let (res, act) = slug
            .split_once(':')
            .ok_or_else(|| AppError::UnknownPermission(slug.to_string()))?;

        let resource = match res {
            "*" => ResourceSelector::Any,
            other => ResourceSelector::One(
                Resource::parse(other).ok_or_else(|| AppError::UnknownPermission(slug.to_string()))?,
            ),
        };

        let action = match act {
            "*" => ActionSelector::Any,
            other => ActionSelector::One(
                Action::parse(other).ok_or_else(|| AppError::UnknownPermission(slug.to_string()))?,
            ),
        };

        Ok(Permission { resource, action })
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let res = match self.resource {
            ResourceSelector::Any => "*",
            ResourceSelector::One(r) => r.as_str(),
        };
        let act = match self.action {
            ActionSelector::Any => "*",
            ActionSelector::One(a) => a.as_str(),
        };
        write!(f, "{}:{}", res, act)
    }
}

/// O conjunto de permissões de um cargo, já convertido para o modelo tipado.
#[derive(Debug, Clone, Default)]
pub struct PermissionSet(HashSet<Permission>);

impl PermissionSet {
    /// Parse estrito, usado na criação/edição de cargos: qualquer slug
    /// desconhecido rejeita o payload inteiro.
    pub fn parse_strict(slugs: &[String]) -> Result<Self, AppError> {
        let mut set = HashSet::new();
        for slug in slugs {
            set.insert(Permission::parse(slug)?);
        }
        Ok(PermissionSet(set))
    }

    /// Parse tolerante, usado ao carregar um cargo do banco: uma entrada
    /// corrompida é ignorada (e logada) em vez de derrubar a autorização.
    pub fn from_stored(slugs: &[String]) -> Self {
        let mut set = HashSet::new();
        for slug in slugs {
            match Permission::parse(slug) {
                Ok(perm) => {
                    set.insert(perm);
                }
                Err(_) => {
                    tracing::warn!("Permissão desconhecida ignorada no cargo: '{}'", slug);
                }
            }
        }
        PermissionSet(set)
    }

    /// A verificação central: o cargo permite a ação se qualquer um dos
    /// três candidatos ("*:*", "recurso:*", "recurso:acao") estiver presente.
    pub fn allows(&self, resource: Resource, action: Action) -> bool {
        self.0.contains(&Permission::all())
            || self.0.contains(&Permission {
                resource: ResourceSelector::One(resource),
                action: ActionSelector::Any,
            })
            || self.0.contains(&Permission {
                resource: ResourceSelector::One(resource),
                action: ActionSelector::One(action),
            })
    }

    pub fn as_slugs(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.0.iter().map(|p| p.to_string()).collect();
        slugs.sort();
        slugs
    }
}

/// Avaliação pura de autorização de um membro: o status bloqueia tudo,
/// independente do conjunto de permissões; cargo ausente nega por padrão.
pub fn membership_allows(
    status: MemberStatus,
    permissions: Option<&PermissionSet>,
    resource: Resource,
    action: Action,
) -> bool {
    if status != MemberStatus::Active {
        return false;
    }
    match permissions {
        Some(perms) => perms.allows(resource, action),
        None => false,
    }
}

// ---
// 2. O cargo (Tabela Roles)
// ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub workspace_id: Uuid,

    #[schema(example = "Vendedor")]
    pub name: String,

    #[schema(example = "Acesso de leitura e escrita aos leads")]
    pub description: Option<String>,

    #[schema(example = json!(["leads:create", "leads:read"]))]
    pub permissions: Vec<String>,

    pub is_default: bool,
    pub is_system: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O Payload para criar um cargo
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[schema(example = "Vendedor")]
    pub name: String,

    #[schema(example = "Pode criar e consultar leads")]
    pub description: Option<String>,

    #[schema(example = json!(["leads:create", "leads:read"]))]
    pub permissions: Vec<String>,
}

// ---
// 3. Catálogo de permissões (para o frontend montar a tela de cargos)
// ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDescriptor {
    #[schema(example = "leads:create")]
    pub slug: String,

    #[schema(example = "Criar leads")]
    pub description: String,

    #[schema(example = "LEADS")]
    pub module: String,
}

/// Enumera todos os pares recurso:acao reconhecidos pelo sistema.
pub fn permission_catalog() -> Vec<PermissionDescriptor> {
    let mut catalog = Vec::new();
    for resource in Resource::ALL {
        for action in Action::ALL {
            catalog.push(PermissionDescriptor {
                slug: format!("{}:{}", resource.as_str(), action.as_str()),
                description: describe(resource, action),
                module: resource.as_str().to_uppercase(),
            });
        }
    }
    catalog
}

fn describe(resource: Resource, action: Action) -> String {
    let verbo = match action {
        Action::Create => "Criar",
        Action::Read => "Visualizar",
        Action::Update => "Editar",
        Action::Delete => "Excluir",
        Action::Assign => "Atribuir",
    };
    let alvo = match resource {
        Resource::Workspaces => "workspaces",
        Resource::Members => "membros",
        Resource::Roles => "cargos",
        Resource::Leads => "leads",
        Resource::Webhooks => "webhooks",
        Resource::Activities => "atividades",
    };
    format!("{} {}", verbo, alvo)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(slugs: &[&str]) -> PermissionSet {
        let owned: Vec<String> = slugs.iter().map(|s| s.to_string()).collect();
        PermissionSet::parse_strict(&owned).expect("slugs de teste devem ser válidos")
    }

    #[test]
    fn wildcard_total_permite_qualquer_par() {
        let perms = set(&["*:*"]);
        for resource in Resource::ALL {
            for action in Action::ALL {
                assert!(perms.allows(resource, action));
            }
        }
    }

    #[test]
    fn wildcard_de_recurso_permite_todas_as_acoes_daquele_recurso() {
        let perms = set(&["leads:*"]);
        for action in Action::ALL {
            assert!(perms.allows(Resource::Leads, action));
        }
        assert!(!perms.allows(Resource::Webhooks, Action::Read));
    }

    #[test]
    fn permissao_exata_nao_vaza_para_outras_acoes() {
        // Cenário do "Vendedor": create e read, nada de delete.
        let perms = set(&["leads:create", "leads:read"]);
        assert!(perms.allows(Resource::Leads, Action::Create));
        assert!(perms.allows(Resource::Leads, Action::Read));
        assert!(!perms.allows(Resource::Leads, Action::Delete));
    }

    #[test]
    fn slug_desconhecido_rejeita_o_payload() {
        let slugs = vec!["leads:create".to_string(), "naoexiste:read".to_string()];
        assert!(matches!(
            PermissionSet::parse_strict(&slugs),
            Err(AppError::UnknownPermission(_))
        ));
    }

    #[test]
    fn parse_tolerante_ignora_entradas_corrompidas() {
        let slugs = vec!["leads:read".to_string(), "lixo".to_string()];
        let perms = PermissionSet::from_stored(&slugs);
        assert!(perms.allows(Resource::Leads, Action::Read));
        assert!(!perms.allows(Resource::Leads, Action::Create));
    }

    #[test]
    fn status_nao_ativo_bloqueia_mesmo_com_curinga_total() {
        let perms = set(&["*:*"]);
        for status in [
            MemberStatus::Pending,
            MemberStatus::Inactive,
            MemberStatus::Suspended,
        ] {
            assert!(!membership_allows(
                status,
                Some(&perms),
                Resource::Leads,
                Action::Read
            ));
        }
        assert!(membership_allows(
            MemberStatus::Active,
            Some(&perms),
            Resource::Leads,
            Action::Read
        ));
    }

    #[test]
    fn cargo_ausente_nega_por_padrao() {
        assert!(!membership_allows(
            MemberStatus::Active,
            None,
            Resource::Leads,
            Action::Read
        ));
    }

    #[test]
    fn slug_e_modelo_tipado_fazem_ida_e_volta() {
        for slug in ["*:*", "leads:*", "webhooks:create", "members:assign"] {
            let perm = Permission::parse(slug).unwrap();
            assert_eq!(perm.to_string(), slug);
        }
    }
}
