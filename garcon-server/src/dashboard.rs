//! Admin dashboard rendering.
//!
//! A pure function from the aggregate view and an order snapshot to a
//! self-contained HTML document. No state, no IO; the handler feeds it and
//! returns the string.

use crate::orders::{LedgerStats, OrderRecord};

/// Dashboard auto-refresh interval.
const REFRESH_MS: u32 = 15_000;

/// Escape a string for safe interpolation into HTML text or attributes.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Format a money amount the way the menu prices read: integral when whole.
fn amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

fn order_row(order: &OrderRecord) -> String {
    let stars = "★".repeat(order.rating.unwrap_or(0) as usize);
    format!(
        "<tr><td>{}</td><td><b>{}</b></td><td>{}</td><td>{}</td>\
         <td><span class=\"badge\">Rs.{}</span></td>\
         <td><span class=\"stars\">{}</span></td><td>{}</td></tr>",
        order.id,
        escape(&order.name),
        escape(&order.phone),
        escape(&order.items.join(", ")),
        amount(order.total),
        stars,
        escape(&order.time),
    )
}

fn orders_table(orders: &[OrderRecord]) -> String {
    if orders.is_empty() {
        return "<div class=\"no-orders\">No orders yet</div>".to_string();
    }

    let rows: String = orders.iter().map(order_row).collect();
    format!(
        "<table><tr><th>#</th><th>Customer</th><th>Phone</th><th>Items</th>\
         <th>Total</th><th>Rating</th><th>Time</th></tr>{rows}</table>"
    )
}

/// Render the dashboard document. `orders` is expected newest first.
pub fn render(stats: &LedgerStats, orders: &[OrderRecord]) -> String {
    let labels: Vec<&str> = stats.top_items.iter().map(|(name, _)| name.as_str()).collect();
    let values: Vec<u32> = stats.top_items.iter().map(|(_, count)| *count).collect();
    // serde_json output is valid JS literal syntax for the inline script
    let chart_labels = serde_json::to_string(&labels).unwrap_or_else(|_| "[]".into());
    let chart_values = serde_json::to_string(&values).unwrap_or_else(|_| "[]".into());

    format!(
        r##"<!DOCTYPE html>
<html>
<head>
    <title>Garcon — Admin Dashboard</title>
    <meta charset="UTF-8">
    <script src="https://cdnjs.cloudflare.com/ajax/libs/Chart.js/4.4.0/chart.umd.min.js"></script>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{ font-family: system-ui, sans-serif; background: #0f0f1a; color: #e2e8f0; padding: 24px; }}
        .header {{ background: linear-gradient(135deg, #667eea, #764ba2); padding: 24px 28px;
                   border-radius: 16px; margin-bottom: 24px; display: flex;
                   justify-content: space-between; align-items: center; }}
        .header h1 {{ font-size: 22px; }}
        .header p {{ opacity: 0.85; font-size: 13px; margin-top: 4px; }}
        .refresh-btn {{ background: rgba(255,255,255,0.1); border: none; color: white;
                        padding: 8px 16px; border-radius: 8px; cursor: pointer; font-size: 13px; }}
        .stats-grid {{ display: grid; grid-template-columns: repeat(4, 1fr); gap: 16px; margin-bottom: 24px; }}
        .stat-card {{ background: #1e1e32; border: 1px solid rgba(255,255,255,0.06);
                      padding: 20px; border-radius: 14px; }}
        .stat-card .value {{ font-size: 28px; font-weight: 700; color: #a78bfa; }}
        .stat-card .label {{ font-size: 13px; color: #64748b; margin-top: 4px; }}
        .charts-grid {{ display: grid; grid-template-columns: 1fr 1fr; gap: 16px; margin-bottom: 24px; }}
        .chart-card {{ background: #1e1e32; border: 1px solid rgba(255,255,255,0.06);
                       padding: 20px; border-radius: 14px; }}
        .chart-card h3 {{ font-size: 14px; margin-bottom: 16px; color: #94a3b8; }}
        .orders-card {{ background: #1e1e32; border: 1px solid rgba(255,255,255,0.06);
                        border-radius: 14px; overflow: hidden; }}
        table {{ width: 100%; border-collapse: collapse; }}
        th {{ padding: 12px 24px; text-align: left; font-size: 12px; color: #475569;
              text-transform: uppercase; background: #16162a; }}
        td {{ padding: 16px 24px; border-bottom: 1px solid rgba(255,255,255,0.04); font-size: 14px; }}
        tr:last-child td {{ border-bottom: none; }}
        .badge {{ background: rgba(34,197,94,0.15); color: #22c55e; padding: 4px 12px;
                  border-radius: 20px; font-size: 12px; font-weight: 600; }}
        .stars {{ color: #fbbf24; font-size: 13px; }}
        .no-orders {{ text-align: center; padding: 48px; color: #475569; }}
    </style>
</head>
<body>
    <div class="header">
        <div>
            <h1>Garcon — Admin Dashboard</h1>
            <p>Live order feed and analytics</p>
        </div>
        <button class="refresh-btn" onclick="location.reload()">Refresh</button>
    </div>

    <div class="stats-grid">
        <div class="stat-card"><div class="value">{total_orders}</div><div class="label">Total Orders</div></div>
        <div class="stat-card"><div class="value">Rs.{total_revenue}</div><div class="label">Total Revenue</div></div>
        <div class="stat-card"><div class="value">{unique_customers}</div><div class="label">Unique Customers</div></div>
        <div class="stat-card"><div class="value">{average_rating}/5</div><div class="label">Avg Rating</div></div>
    </div>

    <div class="charts-grid">
        <div class="chart-card"><h3>Top Ordered Items</h3><canvas id="itemsChart" height="200"></canvas></div>
        <div class="chart-card"><h3>Revenue Overview</h3><canvas id="revenueChart" height="200"></canvas></div>
    </div>

    <div class="orders-card">{orders_table}</div>

    <script>
        const labels = {chart_labels};
        const values = {chart_values};
        const palette = ['#667eea','#764ba2','#f093fb','#f5576c','#4facfe'];

        if (labels.length > 0) {{
            new Chart(document.getElementById('itemsChart'), {{
                type: 'bar',
                data: {{ labels: labels, datasets: [{{ label: 'Orders', data: values,
                         backgroundColor: palette, borderRadius: 8 }}] }},
                options: {{ plugins: {{ legend: {{ display: false }} }} }}
            }});
            new Chart(document.getElementById('revenueChart'), {{
                type: 'doughnut',
                data: {{ labels: labels, datasets: [{{ data: values,
                         backgroundColor: palette, borderWidth: 0 }}] }},
                options: {{ plugins: {{ legend: {{ position: 'bottom' }} }} }}
            }});
        }}

        setTimeout(() => location.reload(), {refresh_ms});
    </script>
</body>
</html>
"##,
        total_orders = stats.total_orders,
        total_revenue = amount(stats.total_revenue),
        unique_customers = stats.unique_customers,
        average_rating = format!("{:.1}", stats.average_rating),
        orders_table = orders_table(orders),
        chart_labels = chart_labels,
        chart_values = chart_values,
        refresh_ms = REFRESH_MS,
    )
}
