/// 缓存键模块
/// 键只由归一化后的请求参数决定

/// 市镇查询缓存键前缀
const COMMUNES_PREFIX: &str = "communes:";

/// 分析结果缓存键前缀
const RESULTATS_PREFIX: &str = "resultats:";

/// 参数代码之间的分隔符
const PARAM_DELIMITER: &str = ",";

/// 转义键中的分隔符，不同的参数组合不会拼出同一个键
fn escape_part(part: &str) -> String {
    part.replace('%', "%25")
        .replace(':', "%3A")
        .replace(',', "%2C")
}

/// 生成市镇查询缓存键
pub fn communes_key(postal: &str) -> String {
    format!("{}{}", COMMUNES_PREFIX, escape_part(postal))
}

/// 生成分析结果缓存键
///
/// 参数代码先排序再拼接，客户端传参顺序不同的等价请求共享同一个键。
pub fn resultats_key(insee: &str, param_ids: &[String]) -> String {
    let mut sorted: Vec<String> = param_ids.iter().map(|id| escape_part(id)).collect();
    sorted.sort_unstable();
    format!(
        "{}{}:{}",
        RESULTATS_PREFIX,
        escape_part(insee),
        sorted.join(PARAM_DELIMITER)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn communes_key_follows_postal_code() {
        assert_eq!(communes_key("75001"), communes_key("75001"));
        assert_ne!(communes_key("75001"), communes_key("75002"));
        assert_ne!(communes_key("75001"), communes_key("75001 "));
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let a = resultats_key("75056", &ids(&["1340", "1301", "1302"]));
        let b = resultats_key("75056", &ids(&["1302", "1340", "1301"]));
        assert_eq!(a, b);
        assert_eq!(a, "resultats:75056:1301,1302,1340");
    }

    #[test]
    fn distinct_parameter_sets_differ() {
        assert_ne!(
            resultats_key("75056", &ids(&["1301"])),
            resultats_key("75056", &ids(&["1301", "1302"]))
        );
        assert_ne!(
            resultats_key("75056", &ids(&["1301"])),
            resultats_key("69123", &ids(&["1301"]))
        );
    }

    #[test]
    fn no_parameters() {
        assert_eq!(resultats_key("75056", &[]), "resultats:75056:");
    }

    #[test]
    fn separators_in_parts_cannot_collide() {
        assert_ne!(
            resultats_key("a:b", &[]),
            resultats_key("a", &ids(&["b:"]))
        );
        assert_ne!(
            resultats_key("75056", &ids(&["1301,1302"])),
            resultats_key("75056", &ids(&["1301", "1302"]))
        );
        assert_eq!(resultats_key("a:b", &[]), "resultats:a%3Ab:");
        assert_eq!(communes_key("75%001"), "communes:75%25001");
    }
}
