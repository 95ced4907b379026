/// 参考姿态名称最大长度
pub const MAX_REFERENCE_NAME_LEN: usize = 64;

/// 验证参考姿态名称：1-64 字符，只允许 ASCII 字母、数字、下划线和连字符
pub fn validate_reference_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() || name.len() > MAX_REFERENCE_NAME_LEN {
        return Err("参考姿态名称长度需在1到64个字符之间");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err("参考姿态名称只能包含字母、数字、下划线和连字符");
    }
    Ok(())
}
