//! Services allowed to send messages

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::validate::{Validate, Violations};
use super::{Document, FiscalCode, VersionedDocument};

/// Largest payment amount a service may request, in euro cents
pub const MAX_PAYMENT_AMOUNT: u64 = 9_999_999_999;

/// Geographic scope of a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceScope {
    National,
    Local,
}

/// Category of a service; special services get dedicated handling downstream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialServiceCategory {
    Standard,
    Special,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMetadata {
    pub scope: ServiceScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SpecialServiceCategory>,
}

/// A service record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewService {
    pub service_id: String,
    pub service_name: String,
    pub organization_name: String,
    pub organization_fiscal_code: String,
    pub department_name: String,
    pub is_visible: bool,
    #[serde(rename = "authorizedCIDRs", default)]
    pub authorized_cidrs: BTreeSet<String>,
    #[serde(default)]
    pub authorized_recipients: BTreeSet<FiscalCode>,
    pub max_allowed_payment_amount: u64,
    pub require_secure_channels: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_metadata: Option<ServiceMetadata>,
}

impl Document for NewService {
    const COLLECTION: &'static str = "services";
    const ENTITY: &'static str = "service";

    fn partition_key(&self) -> &str {
        &self.service_id
    }
}

impl VersionedDocument for NewService {
    fn model_id(&self) -> &str {
        &self.service_id
    }
}

impl Validate for NewService {
    fn validate(&self, v: &mut Violations) {
        v.non_empty("serviceId", &self.service_id);
        v.non_empty("serviceName", &self.service_name);
        v.non_empty("organizationName", &self.organization_name);
        v.non_empty("departmentName", &self.department_name);
        if self.organization_fiscal_code.len() != 11
            || !self.organization_fiscal_code.bytes().all(|b| b.is_ascii_digit())
        {
            v.push("organizationFiscalCode", "must be 11 digits");
        }
        v.in_range("maxAllowedPaymentAmount", self.max_allowed_payment_amount, 0, MAX_PAYMENT_AMOUNT);
        for (i, cidr) in self.authorized_cidrs.iter().enumerate() {
            v.cidr(&format!("authorizedCIDRs.{}", i), cidr);
        }
    }
}
