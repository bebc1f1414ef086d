//! Entity models
//!
//! One module per entity: the persisted row struct, the create/update
//! payloads, and the canonical response projection. The matching
//! validation specs live server-side in `utils::validation`.

pub mod category;
pub mod dining_table;
pub mod food;
pub mod order;
pub mod permission;
pub mod role;
pub mod transaction;
pub mod user;

pub use category::{Category, CategoryBrief, CategoryCreate, CategoryResource, CategoryUpdate};
pub use dining_table::{
    DiningTable, DiningTableCreate, DiningTableResource, DiningTableUpdate, SetTableRequest,
    AVAILABLE, OCCUPIED,
};
pub use food::{Food, FoodCreate, FoodResource, FoodUpdate};
pub use order::{
    DetailOrder, DetailOrderInput, DetailOrderResource, Order, OrderCreate, OrderResource,
    OrderWithDetails, UnservedItem, DETAILS_COMPLETE, DETAILS_PENDING, STATUS_CLOSED, STATUS_OPEN,
};
pub use permission::{Permission, PermissionResource};
pub use role::{Role, RoleBrief, RoleCreate, RoleResource, RoleUpdate, SyncPermissionsRequest};
pub use transaction::{
    Transaction, TransactionCreate, TransactionResource, TransactionWithOrder,
};
pub use user::{SyncRolesRequest, User, UserCreate, UserResource, UserUpdate};
