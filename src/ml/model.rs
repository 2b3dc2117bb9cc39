use burn::{
    nn::{
        attention::{MultiHeadAttention, MultiHeadAttentionConfig},
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::ml::loss::DiceLossConfig;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct ChunkerModelConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    pub dropout:     f64,
}

impl ChunkerModelConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> ChunkerModel<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        // One (not-split, split) logit pair per token
        let chunk_head = LinearConfig::new(self.d_model, 2).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        ChunkerModel {
            token_embedding, position_embedding, layers,
            final_norm, chunk_head, dropout,
            max_seq_len: self.max_seq_len,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        use burn::nn::attention::MhaInput;
        let attn_output = self.self_attn.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct ChunkerModel<B: Backend> {
    pub token_embedding:    Embedding<B>,
    pub position_embedding: Embedding<B>,
    pub layers:             Vec<EncoderBlock<B>>,
    pub final_norm:         LayerNorm<B>,
    pub chunk_head:         Linear<B>,
    pub dropout:            Dropout,
    pub max_seq_len:        usize,
}

/// Both model outputs are kept: the hidden states feed the span
/// aggregator, the logits feed the split decoder and the loss.
pub struct ChunkerOutput<B: Backend> {
    /// Final encoder states — [batch, seq_len, d_model]
    pub hidden: Tensor<B, 3>,
    /// Per-token (not-split, split) logits — [batch, seq_len, 2]
    pub logits: Tensor<B, 3>,
}

impl<B: Backend> ChunkerModel<B> {
    /// input_ids: [batch, seq_len] → hidden [batch, seq_len, d_model],
    /// logits [batch, seq_len, 2]
    pub fn forward(&self, input_ids: Tensor<B, 2, Int>) -> ChunkerOutput<B> {
        let [batch_size, seq_len] = input_ids.dims();

        let tok_emb = self.token_embedding.forward(input_ids);

        // Self-attention is permutation-invariant, so position must be injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &tok_emb.device())
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);

        let mut x = self.dropout.forward(tok_emb + pos_emb);
        for layer in &self.layers {
            x = layer.forward(x);
        }
        let hidden = self.final_norm.forward(x); // [batch, seq_len, d_model]

        let logits = self.chunk_head.forward(hidden.clone()); // [batch, seq_len, 2]

        ChunkerOutput { hidden, logits }
    }

    /// Forward pass + dice loss over the flattened token stream.
    /// Positions labelled NotRelevant (-1) never reach the loss.
    pub fn forward_loss(
        &self,
        input_ids:    Tensor<B, 2, Int>,
        chunk_labels: Tensor<B, 2, Int>,
    ) -> (Tensor<B, 1>, ChunkerOutput<B>)
    where
        B: AutodiffBackend,
    {
        let output = self.forward(input_ids);
        let [batch_size, seq_len, _] = output.logits.dims();

        let dice = DiceLossConfig::new().init();
        let loss = dice.forward(
            output.logits.clone().reshape([batch_size * seq_len, 2]),
            chunk_labels.reshape([batch_size * seq_len]),
        );
        (loss, output)
    }
}
