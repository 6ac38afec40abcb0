//! `shopctl` command definitions.

use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use uuid::Uuid;

use crate::types::{MovementKind, SaleLine};

fn money(s: &str) -> Result<i64, String> {
    common::money::parse_cents(s).map_err(|e| e.to_string())
}

#[derive(Parser, Debug)]
#[command(name = "shopctl")]
#[command(version)]
#[command(about = "Command line for the auto repair shop API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL; `AUTOSHOP_URL` when omitted
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// More logging on stderr (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and keep the session for later commands
    Login {
        username: String,
        #[arg(long, env = "SHOPCTL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Self sign-up
    #[command(subcommand)]
    Register(RegisterCommand),
    #[command(subcommand)]
    Customers(CustomerCommand),
    #[command(subcommand)]
    Mechanics(MechanicCommand),
    #[command(subcommand)]
    Suppliers(SupplierCommand),
    /// Create another manager account
    AddManager {
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, env = "SHOPCTL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    #[command(subcommand)]
    Products(ProductCommand),
    /// Record a stock movement
    Stock {
        #[arg(value_enum)]
        kind: MovementKind,
        product: Uuid,
        quantity: i32,
        #[arg(long, value_parser = money)]
        unit_cost: Option<i64>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Stock movement history
    Movements {
        #[arg(long)]
        product: Option<Uuid>,
    },
    #[command(subcommand)]
    Services(ServiceCommand),
    #[command(subcommand)]
    Vehicles(VehicleCommand),
    #[command(subcommand)]
    Appointments(AppointmentCommand),
    #[command(subcommand)]
    Quotes(QuoteCommand),
    #[command(subcommand)]
    Orders(OrderCommand),
    #[command(subcommand)]
    Checklists(ChecklistCommand),
    #[command(subcommand)]
    Reports(ReportCommand),
    #[command(subcommand)]
    Sales(SaleCommand),
    #[command(subcommand)]
    PurchaseOrders(PurchaseOrderCommand),
    #[command(subcommand)]
    Notifications(NotificationCommand),
}

#[derive(Args, Debug)]
pub struct ContactArgs {
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long, default_value = "")]
    pub address: String,
    #[arg(long, env = "SHOPCTL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Subcommand, Debug)]
pub enum RegisterCommand {
    Customer {
        #[arg(long)]
        name: String,
        /// CPF, 11 digits; becomes the login
        #[arg(long)]
        cpf: String,
        #[command(flatten)]
        contact: ContactArgs,
    },
    Supplier {
        #[arg(long)]
        company_name: String,
        /// CNPJ, 14 digits; becomes the login
        #[arg(long)]
        cnpj: String,
        #[command(flatten)]
        contact: ContactArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    List,
    Show {
        id: Uuid,
    },
    /// Register a walk-in customer; prints the generated login
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "")]
        address: String,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum MechanicCommand {
    List,
    Show {
        id: Uuid,
    },
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        cpf: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        address: String,
    },
    Update {
        id: Uuid,
        #[command(flatten)]
        contact: ContactUpdate,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum SupplierCommand {
    List,
    Show {
        id: Uuid,
    },
    Add {
        #[arg(long)]
        company_name: String,
        #[arg(long)]
        cnpj: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "")]
        address: String,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        company_name: Option<String>,
        #[command(flatten)]
        contact: ContactUpdate,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct ContactUpdate {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommand {
    List {
        /// Only products at or below their minimum stock
        #[arg(long)]
        low_stock: bool,
    },
    Show {
        id: Uuid,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = money)]
        price: Option<i64>,
        #[arg(long, value_parser = money)]
        cost: Option<i64>,
        #[arg(long)]
        min_stock: Option<i32>,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: Uuid,
    },
    Add {
        #[arg(long)]
        name: String,
        /// Sale price, e.g. 120.00
        #[arg(long, value_parser = money)]
        price: i64,
        #[arg(long, value_parser = money, default_value = "0")]
        cost: i64,
        #[arg(long, default_value_t = 0)]
        stock: i32,
        #[arg(long)]
        min_stock: Option<i32>,
        #[arg(long)]
        description: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ServiceCommand {
    List,
    Add {
        #[arg(long)]
        description: String,
        #[arg(long, value_parser = money)]
        price: i64,
        #[arg(long)]
        details: Option<String>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = money)]
        price: Option<i64>,
        #[arg(long)]
        details: Option<String>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum VehicleCommand {
    List {
        #[arg(long)]
        customer: Option<Uuid>,
    },
    Add {
        #[arg(long)]
        plate: String,
        #[arg(long)]
        model: String,
        #[arg(long)]
        make: String,
        #[arg(long)]
        year: i32,
        /// Required for staff; customers always add their own vehicles
        #[arg(long)]
        customer: Option<Uuid>,
    },
    Update {
        id: Uuid,
        #[arg(long)]
        plate: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(long)]
        make: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    Delete {
        id: Uuid,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AppointmentStatusArg {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatusArg {
    pub fn as_wire(self) -> &'static str {
        match self {
            AppointmentStatusArg::Pending => "PENDING",
            AppointmentStatusArg::Confirmed => "CONFIRMED",
            AppointmentStatusArg::Completed => "COMPLETED",
            AppointmentStatusArg::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum AppointmentCommand {
    List,
    Show {
        id: Uuid,
    },
    Status {
        id: Uuid,
        #[arg(value_enum)]
        status: AppointmentStatusArg,
    },
    Upcoming {
        #[arg(long)]
        mechanic: Option<Uuid>,
    },
    Schedule {
        #[arg(long)]
        vehicle: Uuid,
        #[arg(long)]
        mechanic: Uuid,
        #[arg(long)]
        service: Uuid,
        /// RFC 3339, e.g. 2026-11-03T09:00:00-03:00
        #[arg(long)]
        starts: DateTime<FixedOffset>,
        #[arg(long)]
        ends: DateTime<FixedOffset>,
        #[arg(long)]
        customer: Option<Uuid>,
        #[arg(long, value_parser = money)]
        price: Option<i64>,
        #[arg(long)]
        notes: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuoteCommand {
    List,
    Show {
        id: Uuid,
    },
    Create {
        #[arg(long)]
        customer: Uuid,
        #[arg(long)]
        vehicle: Uuid,
        #[arg(long)]
        valid_until: NaiveDate,
        #[arg(long)]
        mechanic: Option<Uuid>,
    },
    AddItem {
        quote: Uuid,
        #[arg(long, conflicts_with = "service", required_unless_present = "service")]
        product: Option<Uuid>,
        #[arg(long)]
        service: Option<Uuid>,
        #[arg(long, default_value_t = 1)]
        qty: i32,
        #[arg(long, value_parser = money)]
        price: Option<i64>,
    },
    RemoveItem {
        quote: Uuid,
        item: Uuid,
    },
    Finalize {
        id: Uuid,
    },
    Approve {
        id: Uuid,
    },
    Reject {
        id: Uuid,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OrderStatusArg {
    InProgress,
    AwaitingParts,
    Completed,
    Cancelled,
}

impl OrderStatusArg {
    pub fn as_wire(self) -> &'static str {
        match self {
            OrderStatusArg::InProgress => "IN_PROGRESS",
            OrderStatusArg::AwaitingParts => "AWAITING_PARTS",
            OrderStatusArg::Completed => "COMPLETED",
            OrderStatusArg::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum OrderCommand {
    List,
    Show {
        id: Uuid,
    },
    /// Open a walk-in order without a quote
    Create {
        #[arg(long)]
        vehicle: Uuid,
        #[arg(long)]
        mechanic: Option<Uuid>,
    },
    AddItem {
        order: Uuid,
        #[arg(long, conflicts_with = "service", required_unless_present = "service")]
        product: Option<Uuid>,
        #[arg(long)]
        service: Option<Uuid>,
        #[arg(long, default_value_t = 1)]
        qty: i32,
        #[arg(long, value_parser = money)]
        price: Option<i64>,
    },
    Status {
        id: Uuid,
        #[arg(value_enum)]
        status: OrderStatusArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChecklistCommand {
    List {
        #[arg(long)]
        vehicle: Option<Uuid>,
    },
    Show {
        id: Uuid,
    },
    Add {
        #[arg(long)]
        order: Uuid,
        #[arg(long)]
        fuel_level: String,
        #[arg(long)]
        defect: String,
        #[arg(long)]
        bodywork: Option<String>,
        #[arg(long)]
        tires: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        mechanic: Option<Uuid>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    List,
    Show {
        id: Uuid,
    },
    Add {
        #[arg(long)]
        order: Uuid,
        #[arg(long)]
        diagnosis: String,
        #[arg(long)]
        actions: Option<String>,
        #[arg(long)]
        recommendations: Option<String>,
        #[arg(long)]
        mechanic: Option<Uuid>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SaleCommand {
    List,
    Show {
        id: Uuid,
    },
    Create {
        /// PRODUCT:QTY[:PRICE], repeatable
        #[arg(long = "item", required = true)]
        items: Vec<SaleLine>,
        #[arg(long)]
        customer: Option<Uuid>,
    },
    Cancel {
        id: Uuid,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PurchaseStatusArg {
    Pending,
    Approved,
    Rejected,
    Shipped,
    Delivered,
    Cancelled,
}

impl PurchaseStatusArg {
    pub fn as_wire(self) -> &'static str {
        match self {
            PurchaseStatusArg::Pending => "PENDING",
            PurchaseStatusArg::Approved => "APPROVED",
            PurchaseStatusArg::Rejected => "REJECTED",
            PurchaseStatusArg::Shipped => "SHIPPED",
            PurchaseStatusArg::Delivered => "DELIVERED",
            PurchaseStatusArg::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PurchaseOrderCommand {
    List {
        #[arg(long, value_enum)]
        status: Option<PurchaseStatusArg>,
    },
    Show {
        id: Uuid,
    },
    /// Order a product from its supplier
    Create {
        #[arg(long)]
        product: Uuid,
        #[arg(long)]
        qty: i32,
        /// Defaults to the product's cost
        #[arg(long, value_parser = money)]
        unit_cost: Option<i64>,
    },
    Approve {
        id: Uuid,
    },
    Reject {
        id: Uuid,
        #[arg(long)]
        reason: String,
    },
    Status {
        id: Uuid,
        #[arg(value_enum)]
        status: PurchaseStatusArg,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommand {
    List {
        #[arg(long)]
        unread: bool,
    },
    /// Mark one notification as read
    Read {
        id: Uuid,
    },
}
