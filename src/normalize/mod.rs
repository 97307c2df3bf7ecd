//! 将 Hub'Eau 的异构字段映射为固定的输出结构
//!
//! 每个输出字段由一组按顺序尝试的上游字段名决定，取第一个满足判定条件的值。
//! 市镇查询沿用"非空"判定（空串、0、false 视为缺失），
//! 分析结果使用"存在"判定（只有缺失和 null 视为缺失），保证测得的 0 不会丢失。

use serde_json::Value;

use crate::models::{CommuneRecord, ResultRecord, SOURCE_HUBEAU};

const COMMUNE_NOM: &[&str] = &["nom", "libelle_commune", "commune"];
const COMMUNE_INSEE: &[&str] = &["code_insee", "insee", "code_commune"];
const COMMUNE_POSTAL: &[&str] = &["code_postal"];

const RESULT_PARAMETRE_ID: &[&str] = &["code_parametre", "parametre", "id_parametre"];
const RESULT_PARAMETRE_LIBELLE: &[&str] = &["libelle_parametre", "parametre_libelle"];
const RESULT_VALEUR: &[&str] = &["resultat", "valeur", "value"];
const RESULT_UNITE: &[&str] = &["unite", "unite_resultat", "unit"];
const RESULT_DATE: &[&str] = &["date_prelevement", "prelevement_date", "date"];

const DEFAULT_COMMUNE_NOM: &str = "Commune";

/// 取出记录列表：`{data: [...]}` 信封或裸数组，其余情况视为空
pub fn records(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("data") {
            Some(Value::Array(items)) => items,
            _ => &[],
        },
        _ => &[],
    }
}

/// 字段存在且不为 null
pub fn is_present(value: &Value) -> bool {
    !value.is_null()
}

/// 字段存在且不为"假值"（null、空串、0、false）
pub fn is_non_empty(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 按顺序查找第一个满足 `keep` 的字段值；非对象记录没有任何字段
pub fn first_of<'a>(
    record: &'a Value,
    fields: &[&str],
    keep: fn(&Value) -> bool,
) -> Option<&'a Value> {
    fields
        .iter()
        .filter_map(|field| record.get(*field))
        .find(|value| keep(value))
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn text_of(record: &Value, fields: &[&str]) -> Option<String> {
    first_of(record, fields, is_present).map(to_text)
}

pub fn normalize_communes(payload: &Value, postal: &str) -> Vec<CommuneRecord> {
    records(payload)
        .iter()
        .map(|raw| CommuneRecord {
            nom: first_of(raw, COMMUNE_NOM, is_non_empty)
                .map(to_text)
                .unwrap_or_else(|| DEFAULT_COMMUNE_NOM.to_string()),
            code_insee: first_of(raw, COMMUNE_INSEE, is_non_empty)
                .map(to_text)
                .unwrap_or_default(),
            code_postal: first_of(raw, COMMUNE_POSTAL, is_non_empty)
                .map(to_text)
                .unwrap_or_else(|| postal.to_string()),
        })
        .collect()
}

pub fn normalize_resultats(payload: &Value) -> Vec<ResultRecord> {
    records(payload)
        .iter()
        .map(|raw| ResultRecord {
            parametre_id: text_of(raw, RESULT_PARAMETRE_ID),
            parametre_libelle: text_of(raw, RESULT_PARAMETRE_LIBELLE),
            valeur: first_of(raw, RESULT_VALEUR, is_present)
                .cloned()
                .unwrap_or(Value::Null),
            unite: text_of(raw, RESULT_UNITE),
            date_prelevement: text_of(raw, RESULT_DATE),
            source: SOURCE_HUBEAU.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_data_envelope() {
        let payload = json!({ "count": 1, "data": [{ "nom": "Paris" }] });
        assert_eq!(records(&payload).len(), 1);
    }

    #[test]
    fn bare_array_is_the_record_list() {
        let payload = json!([{ "nom": "Lyon" }, { "nom": "Bron" }]);
        assert_eq!(records(&payload).len(), 2);
    }

    #[test]
    fn non_array_payloads_are_empty() {
        assert!(records(&json!({ "message": "ok" })).is_empty());
        assert!(records(&json!({ "data": { "nom": "Paris" } })).is_empty());
        assert!(records(&json!("nothing")).is_empty());
        assert!(records(&Value::Null).is_empty());
    }

    #[test]
    fn zero_result_is_kept() {
        let rows = normalize_resultats(&json!([{ "resultat": 0, "unite": "mg/L" }]));
        assert_eq!(rows[0].valeur, json!(0));
        assert_eq!(rows[0].unite.as_deref(), Some("mg/L"));
    }

    #[test]
    fn false_result_is_kept() {
        let rows = normalize_resultats(&json!([{ "resultat": false, "valeur": 3 }]));
        assert_eq!(rows[0].valeur, json!(false));
    }

    #[test]
    fn null_falls_through_to_next_alias() {
        let rows = normalize_resultats(&json!([{ "resultat": null, "valeur": "<0,5" }]));
        assert_eq!(rows[0].valeur, json!("<0,5"));
    }

    #[test]
    fn empty_record_yields_nulls_except_source() {
        let rows = normalize_resultats(&json!([{}]));
        let out = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(
            out,
            json!({
                "parametre_id": null,
                "parametre_libelle": null,
                "valeur": null,
                "unite": null,
                "date_prelevement": null,
                "source": "Hub'Eau",
            })
        );
    }

    #[test]
    fn result_aliases_are_used_in_order() {
        let rows = normalize_resultats(&json!([{
            "id_parametre": "1340",
            "parametre": "1301",
            "parametre_libelle": "Température de l'eau",
            "value": 12.5,
            "unit": "°C",
            "unite_resultat": "°C (alt)",
            "date": "2024-02-01",
        }]));
        let row = &rows[0];
        assert_eq!(row.parametre_id.as_deref(), Some("1301"));
        assert_eq!(row.parametre_libelle.as_deref(), Some("Température de l'eau"));
        assert_eq!(row.valeur, json!(12.5));
        assert_eq!(row.unite.as_deref(), Some("°C (alt)"));
        assert_eq!(row.date_prelevement.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn numeric_parameter_code_becomes_text() {
        let rows = normalize_resultats(&json!([{ "code_parametre": 1301 }]));
        assert_eq!(rows[0].parametre_id.as_deref(), Some("1301"));
    }

    #[test]
    fn commune_fallbacks() {
        let payload = json!({ "data": [
            { "libelle_commune": "Marseille", "code_commune": "13055" },
            { "nom": "", "commune": "Aix", "insee": 13001, "code_postal": "13090" },
            {},
        ]});
        let communes = normalize_communes(&payload, "13000");

        assert_eq!(
            communes[0],
            CommuneRecord {
                nom: "Marseille".into(),
                code_insee: "13055".into(),
                code_postal: "13000".into(),
            }
        );
        assert_eq!(communes[1].nom, "Aix");
        assert_eq!(communes[1].code_insee, "13001");
        assert_eq!(communes[1].code_postal, "13090");
        assert_eq!(
            communes[2],
            CommuneRecord {
                nom: "Commune".into(),
                code_insee: String::new(),
                code_postal: "13000".into(),
            }
        );
    }

    #[test]
    fn non_object_record_gets_defaults() {
        let communes = normalize_communes(&json!([42]), "75001");
        assert_eq!(communes[0].nom, "Commune");
        assert_eq!(communes[0].code_postal, "75001");
    }
}
