//! Daily chart series for the protocol, a pool or a token.
//!
//! Each series is paged out of its day-data entity, mapped into
//! [`ChartDayData`] rows and gap-filled up to the day before now.

use chrono::Utc;
use serde::Deserialize;

use crate::client::GraphClient;
use crate::error::Result;
use crate::query::fetch_paged;
use crate::types::{decimal_from_str, ChartDayData};
use crate::utils::fill_missing_days;

fn protocol_chart_query(start_timestamp: i64, skip: usize) -> String {
    format!(
        "query protocolChart {{
            exchangeDayDatas(
                first: 1000
                skip: {skip}
                where: {{ date_gt: {start_timestamp} }}
                orderBy: date
                orderDirection: asc
            ) {{
                date
                dailyVolumeUSD
                totalLiquidityUSD
            }}
        }}"
    )
}

fn pool_chart_query(address: &str, start_timestamp: i64, skip: usize) -> String {
    format!(
        "query poolChart {{
            pairDayDatas(
                first: 1000
                skip: {skip}
                where: {{ pairAddress: \"{address}\", date_gt: {start_timestamp} }}
                orderBy: date
                orderDirection: asc
            ) {{
                date
                dailyVolumeUSD
                reserveUSD
            }}
        }}"
    )
}

fn token_chart_query(address: &str, start_timestamp: i64, skip: usize) -> String {
    format!(
        "query tokenChart {{
            tokenDayDatas(
                first: 1000
                skip: {skip}
                where: {{ token: \"{address}\", date_gt: {start_timestamp} }}
                orderBy: date
                orderDirection: asc
            ) {{
                date
                dailyVolumeUSD
                totalLiquidityUSD
            }}
        }}"
    )
}

#[derive(Debug, Deserialize)]
struct DayDataFields {
    date: i64,
    #[serde(rename = "dailyVolumeUSD", deserialize_with = "decimal_from_str")]
    daily_volume_usd: f64,
    #[serde(rename = "totalLiquidityUSD", deserialize_with = "decimal_from_str")]
    total_liquidity_usd: f64,
}

#[derive(Debug, Deserialize)]
struct PairDayDataFields {
    date: i64,
    #[serde(rename = "dailyVolumeUSD", deserialize_with = "decimal_from_str")]
    daily_volume_usd: f64,
    #[serde(rename = "reserveUSD", deserialize_with = "decimal_from_str")]
    reserve_usd: f64,
}

#[derive(Debug, Deserialize)]
struct ProtocolChartResponse {
    #[serde(rename = "exchangeDayDatas")]
    exchange_day_datas: Vec<DayDataFields>,
}

#[derive(Debug, Deserialize)]
struct PoolChartResponse {
    #[serde(rename = "pairDayDatas")]
    pair_day_datas: Vec<PairDayDataFields>,
}

#[derive(Debug, Deserialize)]
struct TokenChartResponse {
    #[serde(rename = "tokenDayDatas")]
    token_day_datas: Vec<DayDataFields>,
}

fn into_chart_day(fields: DayDataFields) -> ChartDayData {
    ChartDayData {
        date: fields.date,
        volume_usd: fields.daily_volume_usd,
        tvl_usd: fields.total_liquidity_usd,
    }
}

/// Full protocol-wide daily series since `start_timestamp`, gap-filled.
pub async fn fetch_protocol_chart(
    client: &GraphClient,
    start_timestamp: i64,
) -> Result<Vec<ChartDayData>> {
    let rows = fetch_paged(|skip| {
        let query = protocol_chart_query(start_timestamp, skip);
        async move {
            let response: ProtocolChartResponse = client.query(&query).await?;
            Ok(response.exchange_day_datas)
        }
    })
    .await?;

    let rows = rows.into_iter().map(into_chart_day).collect();
    Ok(fill_missing_days(
        rows,
        start_timestamp,
        Utc::now().timestamp(),
    ))
}

/// Daily series of one pool since `start_timestamp`, gap-filled. Pool TVL
/// comes from the pair's reserve value.
pub async fn fetch_pool_chart(
    client: &GraphClient,
    address: &str,
    start_timestamp: i64,
) -> Result<Vec<ChartDayData>> {
    let rows = fetch_paged(|skip| {
        let query = pool_chart_query(address, start_timestamp, skip);
        async move {
            let response: PoolChartResponse = client.query(&query).await?;
            Ok(response.pair_day_datas)
        }
    })
    .await?;

    let rows = rows
        .into_iter()
        .map(|fields| ChartDayData {
            date: fields.date,
            volume_usd: fields.daily_volume_usd,
            tvl_usd: fields.reserve_usd,
        })
        .collect();
    Ok(fill_missing_days(
        rows,
        start_timestamp,
        Utc::now().timestamp(),
    ))
}

/// Daily series of one token since `start_timestamp`, gap-filled.
pub async fn fetch_token_chart(
    client: &GraphClient,
    address: &str,
    start_timestamp: i64,
) -> Result<Vec<ChartDayData>> {
    let rows = fetch_paged(|skip| {
        let query = token_chart_query(address, start_timestamp, skip);
        async move {
            let response: TokenChartResponse = client.query(&query).await?;
            Ok(response.token_day_datas)
        }
    })
    .await?;

    let rows = rows.into_iter().map(into_chart_day).collect();
    Ok(fill_missing_days(
        rows,
        start_timestamp,
        Utc::now().timestamp(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queries_inline_skip_and_filters_as_literals() {
        let query = pool_chart_query("0xaa", 1_619_170_975, 2000);
        assert!(query.contains("skip: 2000"));
        assert!(query.contains("pairAddress: \"0xaa\""));
        assert!(query.contains("date_gt: 1619170975"));
        assert!(query.contains("orderBy: date"));
        assert!(!query.contains('$'));
    }

    #[test]
    fn token_chart_filters_by_token() {
        let query = token_chart_query("0xbb", 100, 0);
        assert!(query.contains("tokenDayDatas"));
        assert!(query.contains("token: \"0xbb\""));
        assert!(query.contains("skip: 0"));
    }

    #[test]
    fn day_rows_decode_decimal_strings() {
        let response: ProtocolChartResponse = serde_json::from_value(serde_json::json!({
            "exchangeDayDatas": [{
                "date": 1633046400,
                "dailyVolumeUSD": "123456.78",
                "totalLiquidityUSD": "9999999.99",
            }],
        }))
        .unwrap();

        let row = into_chart_day(response.exchange_day_datas.into_iter().next().unwrap());
        assert_eq!(row.date, 1_633_046_400);
        assert_eq!(row.volume_usd, 123_456.78);
        assert_eq!(row.tvl_usd, 9_999_999.99);
    }
}
