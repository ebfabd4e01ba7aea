use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS restaurants (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            location TEXT NOT NULL DEFAULT 'denpasar'
        );

        CREATE TABLE IF NOT EXISTS grab_stats (
            restaurant_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            sales REAL NOT NULL DEFAULT 0,
            orders INTEGER NOT NULL DEFAULT 0,
            cancelled_orders INTEGER NOT NULL DEFAULT 0,
            lost_orders INTEGER NOT NULL DEFAULT 0,
            rating REAL,
            ads_spend REAL NOT NULL DEFAULT 0,
            ads_sales REAL NOT NULL DEFAULT 0,
            impressions INTEGER NOT NULL DEFAULT 0,
            offline_minutes REAL NOT NULL DEFAULT 0,
            preparation_minutes REAL NOT NULL DEFAULT 0,
            delivery_minutes REAL NOT NULL DEFAULT 0,
            driver_waiting_seconds REAL NOT NULL DEFAULT 0,
            out_of_stock INTEGER NOT NULL DEFAULT 0,
            busy INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (restaurant_id, date)
        );

        CREATE TABLE IF NOT EXISTS gojek_stats (
            restaurant_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            sales REAL NOT NULL DEFAULT 0,
            orders INTEGER NOT NULL DEFAULT 0,
            cancelled_orders INTEGER NOT NULL DEFAULT 0,
            lost_orders INTEGER NOT NULL DEFAULT 0,
            rating REAL,
            ads_spend REAL NOT NULL DEFAULT 0,
            ads_sales REAL NOT NULL DEFAULT 0,
            impressions INTEGER NOT NULL DEFAULT 0,
            close_time TEXT,
            preparation_time TEXT,
            delivery_time TEXT,
            driver_waiting TEXT,
            out_of_stock INTEGER NOT NULL DEFAULT 0,
            busy INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (restaurant_id, date)
        );

        CREATE TABLE IF NOT EXISTS fake_orders (
            restaurant_id INTEGER NOT NULL,
            date TEXT NOT NULL,
            platform TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0,
            amount REAL NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_grab_date ON grab_stats(date);
        CREATE INDEX IF NOT EXISTS idx_gojek_date ON gojek_stats(date);
        CREATE INDEX IF NOT EXISTS idx_fake_orders_day ON fake_orders(restaurant_id, date);
        "
    ).map_err(|e| format!("Migration failed: {e}"))
}
