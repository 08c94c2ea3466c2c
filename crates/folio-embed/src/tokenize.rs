use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Token ids, attention mask and token type ids for one text, each `[1, T]`.
pub struct Encoded {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, max_len: usize, device: &Device) -> Result<Encoded> {
    let enc = tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mut ids = enc.get_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    let mut type_ids = enc.get_type_ids().to_vec();
    if ids.len() > max_len { ids.truncate(max_len); mask.truncate(max_len); type_ids.truncate(max_len); }
    let len = ids.len();
    let input_ids = Tensor::from_vec(ids, (1, len), device)?;
    let attention_mask = Tensor::from_vec(mask, (1, len), device)?;
    let token_type_ids = Tensor::from_vec(type_ids, (1, len), device)?;
    Ok(Encoded { input_ids, attention_mask, token_type_ids })
}
