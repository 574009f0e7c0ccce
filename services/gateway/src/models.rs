use contracts::events::EventRecord;
use serde::{Deserialize, Serialize};
use types::ids::{Identity, Serial, Upc};
use types::numeric::Amount;
use types::role::Role;

#[derive(Debug, Clone, Deserialize)]
pub struct GrantRoleRequest {
    pub identity: Identity,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleMembershipResponse {
    pub role: Role,
    pub identity: Identity,
    pub held: bool,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderAircraftRequest {
    pub equipment_id: Upc,
    pub manufacturer: Identity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrepareStructureRequest {
    pub origin_plant: String,
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderEquipmentRequest {
    pub upc: Upc,
    pub supplier: Identity,
    pub serial: Serial,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackEquipmentRequest {
    pub transporter: Identity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessEquipmentRequest {
    pub notes: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReceiveComponentRequest {
    pub upc: Upc,
    pub origin_manufacturer: String,
    pub origin_plant: String,
    pub equipment_id: Upc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessComponentRequest {
    pub origin_plant: String,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EscrowBalanceResponse {
    pub identity: Identity,
    pub pending: Amount,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawResponse {
    pub identity: Identity,
    pub amount: Amount,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsQuery {
    #[serde(default)]
    pub since: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventsResponse {
    pub last_sequence: u64,
    pub events: Vec<EventRecord>,
}
