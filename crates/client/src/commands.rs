use std::sync::Arc;

use tracing::debug;

use crate::cli::*;
use crate::error::ClientError;
use crate::http::ApiClient;
use crate::output::emit;
use crate::token_store::{FileTokenStore, TokenStore};
use crate::types::*;

/// Message shown to the user for a failed command.
pub fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::SessionExpired) => "session expired, run `shopctl login` again".to_string(),
        Some(ClientError::NotLoggedIn) => "not logged in, run `shopctl login` first".to_string(),
        Some(e) => e.api_message().unwrap_or_else(|| e.to_string()),
        None => format!("{err:#}"),
    }
}

pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::from_env());
    let client = match cli.url.as_deref() {
        Some(url) => ApiClient::new(url, store)?,
        None => ApiClient::from_env(store)?,
    };
    debug!(base_url = %client.base_url(), "api_client_ready");
    run(&client, cli.command, cli.json).await
}

pub async fn run(client: &ApiClient, command: Commands, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Login { username, password } => emit(&client.login(&username, &password).await?, json),
        Commands::Logout => {
            client.logout()?;
            println!("logged out");
            Ok(())
        }
        Commands::Whoami => emit(&client.me().await?, json),
        Commands::Register(RegisterCommand::Customer { name, cpf, contact }) => {
            let input = CustomerSignup {
                name,
                cpf,
                phone: contact.phone,
                email: contact.email,
                address: contact.address,
                password: contact.password,
            };
            emit(&client.register_customer(&input).await?, json)
        }
        Commands::Register(RegisterCommand::Supplier { company_name, cnpj, contact }) => {
            let input = SupplierSignup {
                company_name,
                cnpj,
                phone: contact.phone,
                email: contact.email,
                address: contact.address,
                password: contact.password,
            };
            emit(&client.register_supplier(&input).await?, json)
        }
        Commands::AddManager { username, name, email, password } => {
            let input = NewManager { username, name, email, password };
            emit(&client.create_manager(&input).await?, json)
        }
        Commands::Customers(cmd) => customers(client, cmd, json).await,
        Commands::Mechanics(cmd) => mechanics(client, cmd, json).await,
        Commands::Suppliers(cmd) => suppliers(client, cmd, json).await,
        Commands::Products(cmd) => products(client, cmd, json).await,
        Commands::Stock { kind, product, quantity, unit_cost, note } => {
            let input = NewMovement { product_id: product, kind, quantity, unit_cost_cents: unit_cost, note };
            emit(&client.record_movement(&input).await?, json)
        }
        Commands::Movements { product } => emit(&client.stock_movements(product).await?, json),
        Commands::Services(cmd) => services(client, cmd, json).await,
        Commands::Vehicles(cmd) => vehicles(client, cmd, json).await,
        Commands::Appointments(cmd) => appointments(client, cmd, json).await,
        Commands::Quotes(cmd) => quotes(client, cmd, json).await,
        Commands::Orders(cmd) => orders(client, cmd, json).await,
        Commands::Checklists(cmd) => checklists(client, cmd, json).await,
        Commands::Reports(cmd) => reports(client, cmd, json).await,
        Commands::Sales(cmd) => sales(client, cmd, json).await,
        Commands::PurchaseOrders(cmd) => purchase_orders(client, cmd, json).await,
        Commands::Notifications(NotificationCommand::List { unread }) => {
            emit(&client.notifications(unread).await?, json)
        }
        Commands::Notifications(NotificationCommand::Read { id }) => emit(&client.mark_read(id).await?, json),
    }
}

fn deleted(what: &str, id: uuid::Uuid) -> anyhow::Result<()> {
    println!("{what} {id} deleted");
    Ok(())
}

async fn customers(client: &ApiClient, cmd: CustomerCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        CustomerCommand::List => emit(&client.customers().await?, json),
        CustomerCommand::Show { id } => emit(&client.customer(id).await?, json),
        CustomerCommand::Add { name, cpf, phone, email, address } => {
            let input = NewCustomer { name, cpf, phone, email, address };
            emit(&client.create_customer(&input).await?, json)
        }
        CustomerCommand::Update { id, name, phone, email, address } => {
            let patch = CustomerPatch { name, cpf: None, phone, email, address };
            emit(&client.update_customer(id, &patch).await?, json)
        }
        CustomerCommand::Delete { id } => {
            client.delete_customer(id).await?;
            deleted("customer", id)
        }
    }
}

fn contact_patch(company_name: Option<String>, contact: ContactUpdate) -> ContactPatch {
    ContactPatch {
        name: contact.name,
        company_name,
        phone: contact.phone,
        email: contact.email,
        address: contact.address,
    }
}

async fn mechanics(client: &ApiClient, cmd: MechanicCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        MechanicCommand::List => emit(&client.mechanics().await?, json),
        MechanicCommand::Show { id } => emit(&client.mechanic(id).await?, json),
        MechanicCommand::Add { name, cpf, phone, email, address } => {
            let input = NewMechanic { name, cpf, phone, email, address };
            emit(&client.create_mechanic(&input).await?, json)
        }
        MechanicCommand::Update { id, contact } => {
            emit(&client.update_mechanic(id, &contact_patch(None, contact)).await?, json)
        }
        MechanicCommand::Delete { id } => {
            client.delete_mechanic(id).await?;
            deleted("mechanic", id)
        }
    }
}

async fn suppliers(client: &ApiClient, cmd: SupplierCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        SupplierCommand::List => emit(&client.suppliers().await?, json),
        SupplierCommand::Show { id } => emit(&client.supplier(id).await?, json),
        SupplierCommand::Add { company_name, cnpj, phone, email, address } => {
            let input = NewSupplier { company_name, cnpj, phone, email, address };
            emit(&client.create_supplier(&input).await?, json)
        }
        SupplierCommand::Update { id, company_name, contact } => {
            emit(&client.update_supplier(id, &contact_patch(company_name, contact)).await?, json)
        }
        SupplierCommand::Delete { id } => {
            client.delete_supplier(id).await?;
            deleted("supplier", id)
        }
    }
}

async fn products(client: &ApiClient, cmd: ProductCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        ProductCommand::List { low_stock } => emit(&client.products(low_stock).await?, json),
        ProductCommand::Show { id } => emit(&client.product(id).await?, json),
        ProductCommand::Add { name, price, cost, stock, min_stock, description } => {
            let input = NewProduct {
                name,
                description,
                cost_cents: cost,
                sale_price_cents: price,
                stock_qty: stock,
                min_stock,
            };
            emit(&client.create_product(&input).await?, json)
        }
        ProductCommand::Update { id, name, price, cost, min_stock, description } => {
            let patch = ProductPatch { name, description, cost_cents: cost, sale_price_cents: price, min_stock };
            emit(&client.update_product(id, &patch).await?, json)
        }
        ProductCommand::Delete { id } => {
            client.delete_product(id).await?;
            deleted("product", id)
        }
    }
}

async fn services(client: &ApiClient, cmd: ServiceCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        ServiceCommand::List => emit(&client.services().await?, json),
        ServiceCommand::Add { description, price, details } => {
            let input = NewService { description, base_price_cents: price, details };
            emit(&client.create_service(&input).await?, json)
        }
        ServiceCommand::Update { id, description, price, details } => {
            let patch = ServicePatch { description, base_price_cents: price, details };
            emit(&client.update_service(id, &patch).await?, json)
        }
        ServiceCommand::Delete { id } => {
            client.delete_service(id).await?;
            deleted("service", id)
        }
    }
}

async fn vehicles(client: &ApiClient, cmd: VehicleCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        VehicleCommand::List { customer } => emit(&client.vehicles(customer).await?, json),
        VehicleCommand::Add { plate, model, make, year, customer } => {
            let input = NewVehicle { customer_id: customer, plate, model, make, year };
            emit(&client.create_vehicle(&input).await?, json)
        }
        VehicleCommand::Update { id, plate, model, make, year } => {
            let patch = VehiclePatch { plate, model, make, year };
            emit(&client.update_vehicle(id, &patch).await?, json)
        }
        VehicleCommand::Delete { id } => {
            client.delete_vehicle(id).await?;
            deleted("vehicle", id)
        }
    }
}

async fn appointments(client: &ApiClient, cmd: AppointmentCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        AppointmentCommand::List => emit(&client.appointments().await?, json),
        AppointmentCommand::Show { id } => emit(&client.appointment(id).await?, json),
        AppointmentCommand::Status { id, status } => {
            emit(&client.set_appointment_status(id, status.as_wire()).await?, json)
        }
        AppointmentCommand::Upcoming { mechanic } => emit(&client.upcoming_appointments(mechanic).await?, json),
        AppointmentCommand::Schedule { vehicle, mechanic, service, starts, ends, customer, price, notes } => {
            let input = NewAppointment {
                customer_id: customer,
                vehicle_id: vehicle,
                mechanic_id: mechanic,
                service_id: service,
                starts_at: starts,
                ends_at: ends,
                price_cents: price,
                notes,
            };
            emit(&client.schedule(&input).await?, json)
        }
    }
}

async fn quotes(client: &ApiClient, cmd: QuoteCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        QuoteCommand::List => emit(&client.quotes().await?, json),
        QuoteCommand::Show { id } => emit(&client.quote(id).await?, json),
        QuoteCommand::Create { customer, vehicle, valid_until, mechanic } => {
            let input = NewQuote { customer_id: customer, vehicle_id: vehicle, mechanic_id: mechanic, valid_until };
            emit(&client.create_quote(&input).await?, json)
        }
        QuoteCommand::AddItem { quote, product, service, qty, price } => {
            let item = NewItem { product_id: product, service_id: service, quantity: qty, unit_price_cents: price };
            emit(&client.add_quote_item(quote, &item).await?, json)
        }
        QuoteCommand::RemoveItem { quote, item } => emit(&client.remove_quote_item(quote, item).await?, json),
        QuoteCommand::Finalize { id } => emit(&client.finalize_quote(id).await?, json),
        QuoteCommand::Approve { id } => emit(&client.approve_quote(id).await?, json),
        QuoteCommand::Reject { id, reason } => emit(&client.reject_quote(id, reason.as_deref()).await?, json),
    }
}

async fn orders(client: &ApiClient, cmd: OrderCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        OrderCommand::List => emit(&client.orders().await?, json),
        OrderCommand::Show { id } => emit(&client.order(id).await?, json),
        OrderCommand::Create { vehicle, mechanic } => {
            let input = NewOrder { vehicle_id: vehicle, mechanic_id: mechanic };
            emit(&client.create_order(&input).await?, json)
        }
        OrderCommand::AddItem { order, product, service, qty, price } => {
            let item = NewItem { product_id: product, service_id: service, quantity: qty, unit_price_cents: price };
            emit(&client.add_order_item(order, &item).await?, json)
        }
        OrderCommand::Status { id, status } => emit(&client.set_order_status(id, status.as_wire()).await?, json),
    }
}

async fn checklists(client: &ApiClient, cmd: ChecklistCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        ChecklistCommand::List { vehicle } => emit(&client.checklists(vehicle).await?, json),
        ChecklistCommand::Show { id } => emit(&client.checklist(id).await?, json),
        ChecklistCommand::Add { order, fuel_level, defect, bodywork, tires, notes, mechanic } => {
            let input = NewChecklist {
                service_order_id: order,
                mechanic_id: mechanic,
                fuel_level,
                bodywork_damage: bodywork,
                tire_condition: tires,
                suspected_defect: defect,
                notes,
            };
            emit(&client.create_checklist(&input).await?, json)
        }
    }
}

async fn reports(client: &ApiClient, cmd: ReportCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        ReportCommand::List => emit(&client.reports().await?, json),
        ReportCommand::Show { id } => emit(&client.report(id).await?, json),
        ReportCommand::Add { order, diagnosis, actions, recommendations, mechanic } => {
            let input = NewReport {
                service_order_id: order,
                mechanic_id: mechanic,
                diagnosis,
                corrective_actions: actions,
                future_recommendations: recommendations,
            };
            emit(&client.create_report(&input).await?, json)
        }
    }
}

async fn sales(client: &ApiClient, cmd: SaleCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        SaleCommand::List => emit(&client.sales().await?, json),
        SaleCommand::Show { id } => emit(&client.sale(id).await?, json),
        SaleCommand::Create { items, customer } => {
            emit(&client.create_sale(&NewSale { customer_id: customer, items }).await?, json)
        }
        SaleCommand::Cancel { id } => emit(&client.cancel_sale(id).await?, json),
    }
}

async fn purchase_orders(client: &ApiClient, cmd: PurchaseOrderCommand, json: bool) -> anyhow::Result<()> {
    match cmd {
        PurchaseOrderCommand::List { status } => {
            emit(&client.purchase_orders(status.map(PurchaseStatusArg::as_wire)).await?, json)
        }
        PurchaseOrderCommand::Show { id } => emit(&client.purchase_order(id).await?, json),
        PurchaseOrderCommand::Create { product, qty, unit_cost } => {
            let input = NewPurchaseOrder { product_id: product, quantity: qty, unit_cost_cents: unit_cost };
            emit(&client.create_purchase_order(&input).await?, json)
        }
        PurchaseOrderCommand::Approve { id } => emit(&client.approve_purchase_order(id).await?, json),
        PurchaseOrderCommand::Reject { id, reason } => emit(&client.reject_purchase_order(id, &reason).await?, json),
        PurchaseOrderCommand::Status { id, status } => {
            emit(&client.set_purchase_order_status(id, status.as_wire()).await?, json)
        }
    }
}
