//! Canonical field lists per report type.
//!
//! These are static configuration: the ordered columns each report must
//! carry when a full-schema export is requested, whether or not the current
//! records populate them.

use serde::{Deserialize, Serialize};

/// Report types with a fixed export template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportType {
    AssetRegister,
    ProcurementManagement,
    AllocationManagement,
    TransferManagement,
    FinancialManagement,
    DisposalManagement,
    MaintenanceManagement,
    AuditManagement,
}

const ASSET_REGISTER: &[&str] = &[
    "asset_id",
    "asset_name",
    "category",
    "sub_category",
    "serial_number",
    "model",
    "location",
    "department",
    "status",
    "purchase_date",
    "purchase_value",
    "current_value",
    "assigned_to",
    "warranty_expiry",
];

const PROCUREMENT_MANAGEMENT: &[&str] = &[
    "procurement_id",
    "asset_name",
    "category",
    "vendor_name",
    "quantity",
    "unit_price",
    "total_cost",
    "order_date",
    "delivery_date",
    "status",
    "approved_by",
];

const ALLOCATION_MANAGEMENT: &[&str] = &[
    "allocation_id",
    "asset_id",
    "asset_name",
    "employee_name",
    "department",
    "location",
    "allocation_date",
    "return_date",
    "status",
    "remarks",
];

const TRANSFER_MANAGEMENT: &[&str] = &[
    "transfer_id",
    "asset_id",
    "asset_name",
    "from_location",
    "to_location",
    "from_department",
    "to_department",
    "transfer_date",
    "approved_by",
    "status",
];

const FINANCIAL_MANAGEMENT: &[&str] = &[
    "asset_id",
    "asset_name",
    "category",
    "purchase_date",
    "purchase_value",
    "depreciation_method",
    "depreciation_rate",
    "accumulated_depreciation",
    "current_value",
    "financial_year",
];

const DISPOSAL_MANAGEMENT: &[&str] = &[
    "asset_id",
    "asset_name",
    "category",
    "disposal_date",
    "disposal_method",
    "disposal_value",
    "reason",
    "approved_by",
];

const MAINTENANCE_MANAGEMENT: &[&str] = &[
    "maintenance_id",
    "asset_id",
    "asset_name",
    "maintenance_type",
    "vendor_name",
    "scheduled_date",
    "completed_date",
    "maintenance_cost",
    "status",
    "remarks",
];

const AUDIT_MANAGEMENT: &[&str] = &[
    "audit_id",
    "asset_id",
    "asset_name",
    "location",
    "audit_date",
    "auditor",
    "physical_status",
    "condition",
    "remarks",
];

impl ReportType {
    /// Every known report type, in menu order.
    pub const ALL: [ReportType; 8] = [
        ReportType::AssetRegister,
        ReportType::ProcurementManagement,
        ReportType::AllocationManagement,
        ReportType::TransferManagement,
        ReportType::FinancialManagement,
        ReportType::DisposalManagement,
        ReportType::MaintenanceManagement,
        ReportType::AuditManagement,
    ];

    /// Looks up a report type by its tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    /// The string tag callers use to select this report type.
    pub fn tag(&self) -> &'static str {
        match self {
            ReportType::AssetRegister => "asset-register",
            ReportType::ProcurementManagement => "procurement-management",
            ReportType::AllocationManagement => "allocation-management",
            ReportType::TransferManagement => "transfer-management",
            ReportType::FinancialManagement => "financial-management",
            ReportType::DisposalManagement => "disposal-management",
            ReportType::MaintenanceManagement => "maintenance-management",
            ReportType::AuditManagement => "audit-management",
        }
    }

    /// The ordered canonical field list of this report type.
    pub fn canonical_fields(&self) -> &'static [&'static str] {
        match self {
            ReportType::AssetRegister => ASSET_REGISTER,
            ReportType::ProcurementManagement => PROCUREMENT_MANAGEMENT,
            ReportType::AllocationManagement => ALLOCATION_MANAGEMENT,
            ReportType::TransferManagement => TRANSFER_MANAGEMENT,
            ReportType::FinancialManagement => FINANCIAL_MANAGEMENT,
            ReportType::DisposalManagement => DISPOSAL_MANAGEMENT,
            ReportType::MaintenanceManagement => MAINTENANCE_MANAGEMENT,
            ReportType::AuditManagement => AUDIT_MANAGEMENT,
        }
    }
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
