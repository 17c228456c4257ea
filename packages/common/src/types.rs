// 通用类型定义

use std::collections::HashMap;

/// 随消息一起传递的附加数据
///
/// 管道本身从不读取其中的内容，键值的含义完全由调用方与具体的
/// 变换器、过滤器和输出端约定。
pub type AuxData = HashMap<String, String>;

/// 从键值对构建附加数据
pub fn aux_data<I, K, V>(pairs: I) -> AuxData
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// 将附加数据转换为 JSON 对象
pub fn aux_to_json(aux: &AuxData) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = aux
        .iter()
        .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
        .collect();
    serde_json::Value::Object(map)
}
